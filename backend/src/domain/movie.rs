//! Movies screened by the cinema.

use uuid::Uuid;

/// Longest accepted title, in characters.
pub const TITLE_MAX_LEN: usize = 150;
/// Highest accepted base price.
pub const BASE_PRICE_MAX: f64 = 100.0;
/// Highest screening room number.
pub const SCREENING_ROOM_MAX: u32 = 30;
/// Largest number of seats a screening can offer.
pub const SEATS_MAX: u32 = 120;

/// Validation errors raised when building a [`Movie`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MovieValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("base price must be between 0 and {max}, got {value}")]
    BasePriceOutOfRange { value: f64, max: f64 },
    #[error("screening room must be between 1 and {max}, got {value}")]
    ScreeningRoomOutOfRange { value: u32, max: u32 },
    #[error("available seats must be at most {max}, got {value}")]
    SeatsOutOfRange { value: u32, max: u32 },
}

impl MovieValidationError {
    /// Field name (camelCase) and machine code for error details.
    #[must_use]
    pub fn field_and_code(&self) -> (&'static str, &'static str) {
        match self {
            Self::EmptyTitle => ("title", "empty_title"),
            Self::TitleTooLong { .. } => ("title", "title_too_long"),
            Self::BasePriceOutOfRange { .. } => ("basePrice", "base_price_out_of_range"),
            Self::ScreeningRoomOutOfRange { .. } => {
                ("scrRoomNumber", "screening_room_out_of_range")
            }
            Self::SeatsOutOfRange { .. } => ("numberOfAvailableSeats", "seats_out_of_range"),
        }
    }
}

/// Unvalidated movie fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    pub id: Uuid,
    pub title: String,
    pub base_price: f64,
    pub screening_room: u32,
    pub available_seats: u32,
}

/// A movie screening.
///
/// ## Invariants
/// - `title` is trimmed, non-empty and at most [`TITLE_MAX_LEN`] characters.
/// - `base_price` is finite and within `0..=BASE_PRICE_MAX`.
/// - `screening_room` is within `1..=SCREENING_ROOM_MAX`.
/// - `available_seats` is at most [`SEATS_MAX`].
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    id: Uuid,
    title: String,
    base_price: f64,
    screening_room: u32,
    available_seats: u32,
}

impl Movie {
    /// Validate a draft into a movie.
    ///
    /// # Examples
    /// ```
    /// use cinema::domain::{Movie, MovieDraft};
    /// use uuid::Uuid;
    ///
    /// let movie = Movie::try_from(MovieDraft {
    ///     id: Uuid::new_v4(),
    ///     title: "Seven Samurai".into(),
    ///     base_price: 25.0,
    ///     screening_room: 3,
    ///     available_seats: 80,
    /// })
    /// .expect("valid movie");
    /// assert_eq!(movie.title(), "Seven Samurai");
    /// ```
    pub fn new(draft: MovieDraft) -> Result<Self, MovieValidationError> {
        let MovieDraft {
            id,
            title,
            base_price,
            screening_room,
            available_seats,
        } = draft;

        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err(MovieValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(MovieValidationError::TitleTooLong { max: TITLE_MAX_LEN });
        }
        if !base_price.is_finite() || !(0.0..=BASE_PRICE_MAX).contains(&base_price) {
            return Err(MovieValidationError::BasePriceOutOfRange {
                value: base_price,
                max: BASE_PRICE_MAX,
            });
        }
        if !(1..=SCREENING_ROOM_MAX).contains(&screening_room) {
            return Err(MovieValidationError::ScreeningRoomOutOfRange {
                value: screening_room,
                max: SCREENING_ROOM_MAX,
            });
        }
        if available_seats > SEATS_MAX {
            return Err(MovieValidationError::SeatsOutOfRange {
                value: available_seats,
                max: SEATS_MAX,
            });
        }

        Ok(Self {
            id,
            title,
            base_price,
            screening_room,
            available_seats,
        })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    #[must_use]
    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    #[must_use]
    pub fn screening_room(&self) -> u32 {
        self.screening_room
    }

    #[must_use]
    pub fn available_seats(&self) -> u32 {
        self.available_seats
    }
}

impl TryFrom<MovieDraft> for Movie {
    type Error = MovieValidationError;

    fn try_from(value: MovieDraft) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Movie> for MovieDraft {
    fn from(value: Movie) -> Self {
        Self {
            id: value.id,
            title: value.title,
            base_price: value.base_price,
            screening_room: value.screening_room,
            available_seats: value.available_seats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> MovieDraft {
        MovieDraft {
            id: Uuid::nil(),
            title: "  Stalker ".to_owned(),
            base_price: 40.0,
            screening_room: 7,
            available_seats: 60,
        }
    }

    #[rstest]
    fn trims_title(draft: MovieDraft) {
        let movie = Movie::new(draft).expect("valid");
        assert_eq!(movie.title(), "Stalker");
    }

    #[rstest]
    #[case(0.0)]
    #[case(100.0)]
    fn accepts_price_bounds(mut draft: MovieDraft, #[case] price: f64) {
        draft.base_price = price;
        assert!(Movie::new(draft).is_ok());
    }

    #[rstest]
    #[case(-0.01)]
    #[case(100.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_prices_out_of_range(mut draft: MovieDraft, #[case] price: f64) {
        draft.base_price = price;
        let err = Movie::new(draft).expect_err("out of range");
        assert_eq!(err.field_and_code().0, "basePrice");
    }

    #[rstest]
    #[case(0)]
    #[case(31)]
    fn rejects_screening_rooms_out_of_range(mut draft: MovieDraft, #[case] room: u32) {
        draft.screening_room = room;
        assert!(matches!(
            Movie::new(draft),
            Err(MovieValidationError::ScreeningRoomOutOfRange { .. })
        ));
    }

    #[rstest]
    fn rejects_too_many_seats(mut draft: MovieDraft) {
        draft.available_seats = SEATS_MAX + 1;
        assert!(matches!(
            Movie::new(draft),
            Err(MovieValidationError::SeatsOutOfRange { .. })
        ));
    }

    #[rstest]
    #[case("   ".to_owned(), MovieValidationError::EmptyTitle)]
    #[case("x".repeat(TITLE_MAX_LEN + 1), MovieValidationError::TitleTooLong { max: TITLE_MAX_LEN })]
    fn rejects_bad_titles(
        mut draft: MovieDraft,
        #[case] title: String,
        #[case] expected: MovieValidationError,
    ) {
        draft.title = title;
        assert_eq!(Movie::new(draft), Err(expected));
    }
}
