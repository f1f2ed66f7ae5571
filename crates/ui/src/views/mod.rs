mod dashboard;
mod login;
mod quiz;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use dashboard::DashboardView;
pub use login::LoginView;
pub use quiz::SubjectQuizView;
pub use state::{ViewError, ViewState, view_state_from_resource};
