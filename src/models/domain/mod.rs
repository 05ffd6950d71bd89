pub mod quiz;
pub mod submission;
pub mod ticket;

pub use quiz::{Quiz, QuizQuestion};
pub use submission::{QuestionResult, SubmissionResult};
pub use ticket::{TicketState, UsedTicket};
