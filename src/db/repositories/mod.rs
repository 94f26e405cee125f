//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod challenge_repo;
pub mod contest_repo;
pub mod result_repo;
pub mod submission_repo;
pub mod user_repo;

pub use challenge_repo::ChallengeRepository;
pub use contest_repo::ContestRepository;
pub use result_repo::ResultRepository;
pub use submission_repo::SubmissionRepository;
pub use user_repo::UserRepository;
