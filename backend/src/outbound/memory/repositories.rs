//! Repository ports over [`InMemoryStore`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    MovieRepository, MovieRepositoryError, TicketRepository, TicketRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{Movie, Ticket, User, UserId, UserRole};

use super::store::{Collections, InMemoryStore};

#[derive(Clone, Debug)]
pub struct InMemoryMovieRepository {
    store: InMemoryStore,
}

impl InMemoryMovieRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn create(&self, movie: &Movie) -> Result<(), MovieRepositoryError> {
        let mut collections = self.store.collections().write().await;
        if collections.movies.contains_key(&movie.id()) {
            return Err(MovieRepositoryError::query(format!(
                "movie {} already exists",
                movie.id()
            )));
        }
        collections.movies.insert(movie.id(), movie.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Movie>, MovieRepositoryError> {
        Ok(self.store.collections().read().await.movies.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Movie>, MovieRepositoryError> {
        Ok(self
            .store
            .collections()
            .read()
            .await
            .movies
            .values()
            .cloned()
            .collect())
    }

    async fn update(&self, movie: &Movie) -> Result<(), MovieRepositoryError> {
        let mut collections = self.store.collections().write().await;
        let stored = collections
            .movies
            .get_mut(&movie.id())
            .ok_or_else(|| MovieRepositoryError::not_found(movie.id()))?;
        *stored = movie.clone();
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), MovieRepositoryError> {
        let mut collections = self.store.collections().write().await;
        if collections
            .tickets
            .values()
            .any(|ticket| ticket.movie_id() == *id)
        {
            return Err(MovieRepositoryError::referenced_by_tickets(*id));
        }
        collections
            .movies
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MovieRepositoryError::not_found(*id))
    }
}

#[derive(Clone, Debug)]
pub struct InMemoryTicketRepository {
    store: InMemoryStore,
}

impl InMemoryTicketRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }

    async fn filtered<F>(&self, keep: F) -> Vec<Ticket>
    where
        F: Fn(&Ticket) -> bool + Send,
    {
        self.store
            .collections()
            .read()
            .await
            .tickets
            .values()
            .filter(|ticket| keep(ticket))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn create(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let mut collections = self.store.collections().write().await;
        if collections.tickets.contains_key(&ticket.id()) {
            return Err(TicketRepositoryError::query(format!(
                "ticket {} already exists",
                ticket.id()
            )));
        }
        collections.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Ticket>, TicketRepositoryError> {
        Ok(self.store.collections().read().await.tickets.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Ticket>, TicketRepositoryError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn find_by_client(&self, client_id: &UserId) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let client_id = *client_id;
        Ok(self
            .filtered(move |ticket| ticket.client_id() == client_id)
            .await)
    }

    async fn find_by_movie(&self, movie_id: &Uuid) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let movie_id = *movie_id;
        Ok(self.filtered(move |ticket| ticket.movie_id() == movie_id).await)
    }

    async fn count_by_movie(&self, movie_id: &Uuid) -> Result<u64, TicketRepositoryError> {
        let count = self.find_by_movie(movie_id).await?.len();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn update(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let mut collections = self.store.collections().write().await;
        let stored = collections
            .tickets
            .get_mut(&ticket.id())
            .ok_or_else(|| TicketRepositoryError::not_found(ticket.id()))?;
        *stored = ticket.clone();
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), TicketRepositoryError> {
        self.store
            .collections()
            .write()
            .await
            .tickets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TicketRepositoryError::not_found(*id))
    }
}

#[derive(Clone, Debug)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

impl InMemoryUserRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn login_taken(collections: &Collections, user: &User) -> bool {
    collections
        .users
        .values()
        .any(|other| other.id() != user.id() && other.login() == user.login())
}

fn of_role<'a>(
    collections: &'a mut Collections,
    role: UserRole,
    id: &UserId,
) -> Option<&'a mut User> {
    collections
        .users
        .get_mut(id.as_uuid())
        .filter(|user| user.role() == role)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut collections = self.store.collections().write().await;
        if login_taken(&collections, user) {
            return Err(UserRepositoryError::duplicate_login(user.login().as_str()));
        }
        if collections.users.contains_key(user.id().as_uuid()) {
            return Err(UserRepositoryError::query(format!(
                "user {} already exists",
                user.id()
            )));
        }
        collections.users.insert(*user.id().as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        role: UserRole,
        id: &UserId,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .store
            .collections()
            .read()
            .await
            .users
            .get(id.as_uuid())
            .filter(|user| user.role() == role)
            .cloned())
    }

    async fn find_by_login(
        &self,
        role: UserRole,
        login: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .store
            .collections()
            .read()
            .await
            .users
            .values()
            .find(|user| user.role() == role && user.login().as_str() == login)
            .cloned())
    }

    async fn find_matching_login(
        &self,
        role: UserRole,
        fragment: &str,
    ) -> Result<Vec<User>, UserRepositoryError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .store
            .collections()
            .read()
            .await
            .users
            .values()
            .filter(|user| {
                user.role() == role && user.login().as_str().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn find_all(&self, role: UserRole) -> Result<Vec<User>, UserRepositoryError> {
        Ok(self
            .store
            .collections()
            .read()
            .await
            .users
            .values()
            .filter(|user| user.role() == role)
            .cloned()
            .collect())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut collections = self.store.collections().write().await;
        if login_taken(&collections, user) {
            return Err(UserRepositoryError::duplicate_login(user.login().as_str()));
        }
        let stored = of_role(&mut collections, user.role(), &user.id())
            .ok_or_else(|| UserRepositoryError::not_found(user.id()))?;
        *stored = user.clone();
        Ok(())
    }

    async fn set_active(
        &self,
        role: UserRole,
        id: &UserId,
        active: bool,
    ) -> Result<(), UserRepositoryError> {
        let mut collections = self.store.collections().write().await;
        of_role(&mut collections, role, id)
            .ok_or_else(|| UserRepositoryError::not_found(*id))?
            .set_active(active);
        Ok(())
    }

    async fn delete(&self, role: UserRole, id: &UserId) -> Result<(), UserRepositoryError> {
        let mut collections = self.store.collections().write().await;
        if of_role(&mut collections, role, id).is_none() {
            return Err(UserRepositoryError::not_found(*id));
        }
        collections.users.remove(id.as_uuid());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Login, MovieDraft, PasswordHash};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new()
    }

    fn account(login: &str, role: UserRole) -> User {
        User::new(
            UserId::random(),
            Login::new(login).expect("login"),
            PasswordHash::new("$argon2id$stub"),
            role,
        )
    }

    fn movie() -> Movie {
        Movie::new(MovieDraft {
            id: Uuid::new_v4(),
            title: "Tampopo".to_owned(),
            base_price: 14.0,
            screening_room: 5,
            available_seats: 30,
        })
        .expect("valid movie")
    }

    #[rstest]
    #[tokio::test]
    async fn logins_are_unique_across_roles(store: InMemoryStore) {
        let users = InMemoryUserRepository::new(store);
        users
            .create(&account("moviegoer", UserRole::Client))
            .await
            .expect("first");

        let err = users
            .create(&account("moviegoer", UserRole::Staff))
            .await
            .expect_err("duplicate");

        assert_eq!(err, UserRepositoryError::duplicate_login("moviegoer"));
    }

    #[rstest]
    #[tokio::test]
    async fn lookups_are_scoped_by_role(store: InMemoryStore) {
        let users = InMemoryUserRepository::new(store);
        let admin = account("boxoffice", UserRole::Admin);
        users.create(&admin).await.expect("created");

        let as_client = users
            .find_by_id(UserRole::Client, &admin.id())
            .await
            .expect("query");
        let delete = users.delete(UserRole::Client, &admin.id()).await;

        assert!(as_client.is_none());
        assert_eq!(delete, Err(UserRepositoryError::not_found(admin.id())));
    }

    #[rstest]
    #[tokio::test]
    async fn matching_logins_ignores_case(store: InMemoryStore) {
        let users = InMemoryUserRepository::new(store);
        users
            .create(&account("NightOwl_1", UserRole::Client))
            .await
            .expect("created");
        users
            .create(&account("earlybird", UserRole::Client))
            .await
            .expect("created");

        let found = users
            .find_matching_login(UserRole::Client, "owl")
            .await
            .expect("query");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].login().as_str(), "NightOwl_1");
    }

    #[rstest]
    #[tokio::test]
    async fn movies_with_tickets_cannot_be_deleted(store: InMemoryStore) {
        let movies = InMemoryMovieRepository::new(store.clone());
        let tickets = InMemoryTicketRepository::new(store);
        let movie = movie();
        movies.create(&movie).await.expect("movie");
        let ticket = Ticket::issue(Uuid::new_v4(), Utc::now(), UserId::random(), &movie);
        tickets.create(&ticket).await.expect("ticket");

        assert_eq!(
            movies.delete(&movie.id()).await,
            Err(MovieRepositoryError::referenced_by_tickets(movie.id()))
        );

        tickets.delete(&ticket.id()).await.expect("ticket removed");
        movies.delete(&movie.id()).await.expect("movie removed");
        assert_eq!(tickets.count_by_movie(&movie.id()).await, Ok(0));
    }

    #[rstest]
    #[tokio::test]
    async fn set_active_reports_missing_accounts(store: InMemoryStore) {
        let users = InMemoryUserRepository::new(store);
        let id = UserId::random();

        assert_eq!(
            users.set_active(UserRole::Client, &id, false).await,
            Err(UserRepositoryError::not_found(id))
        );
    }
}
