//! Daily simulation passes
//!
//! Each submodule implements one pass of the day loop; `tick` runs them
//! in the fixed order that keeps the draw sequence stable.

pub mod finance;
pub mod orders;
pub mod payroll;
pub mod tick;
pub mod traffic;
pub mod value_added;
pub mod workforce;

pub use finance::{apply_hq_finance, FinanceDay};
pub use orders::{allocate_orders, effective_capacity, generate_projects, OrderAllocation};
pub use payroll::{compute_payroll, PayrollDay, PayrollInputs, RolePayrollDay};
pub use tick::simulate_day;
pub use traffic::{competition_factor, sample_traffic, DayTraffic};
pub use value_added::{simulate_value_added, ValueAddedConfig, ValueAddedDay};
pub use workforce::{workforce_daily, WorkforceDay};
