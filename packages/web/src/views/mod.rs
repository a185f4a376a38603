mod guard;
pub use guard::SessionGuard;

mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod account;
pub use account::{ForgotPassword, ResetPassword, VerifyEmail};

mod dashboard;
pub use dashboard::Dashboard;

mod documents;
pub use documents::Documents;

mod relationships;
pub use relationships::Relationships;

mod profile;
pub use profile::Profile;

mod not_found;
pub use not_found::NotFound;
