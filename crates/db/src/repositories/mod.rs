//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a transaction executor) as the first argument.

pub mod case_repo;
pub mod contact_repo;
pub mod contract_repo;
pub mod contract_template_repo;
pub mod dashboard_repo;
pub mod enquiry_repo;
pub mod freelancer_repo;
pub mod invoice_repo;
pub mod mentor_repo;
pub mod reminder_repo;
pub mod training_repo;
pub mod user_repo;

pub use case_repo::CaseRepo;
pub use contact_repo::ContactRepo;
pub use contract_repo::ContractRepo;
pub use contract_template_repo::ContractTemplateRepo;
pub use dashboard_repo::DashboardRepo;
pub use enquiry_repo::EnquiryRepo;
pub use freelancer_repo::FreelancerRepo;
pub use invoice_repo::InvoiceRepo;
pub use mentor_repo::MentorRepo;
pub use reminder_repo::ReminderRepo;
pub use training_repo::TrainingRepo;
pub use user_repo::UserRepo;
