pub mod cleanup;
pub mod eligibility;
pub mod scoring;
pub mod submission_service;
pub mod ticket_service;

pub use cleanup::TicketCleanupJob;
pub use submission_service::SubmissionService;
pub use ticket_service::{ConsumeOutcome, TicketService};
