pub mod budget_repo;
pub mod line_item_repo;
pub mod project_repo;
pub mod report_repo;
pub mod supplier_repo;

pub use budget_repo::{BudgetRepository, BudgetRow, ProjectBudgetRow};
pub use line_item_repo::{LineItemRepository, LineItemRow, NewLineItem};
pub use project_repo::{NewProject, ProjectRepository, ProjectRow, ProjectSummary};
pub use report_repo::{CategorySpend, MonthlySpend, ReportRepository, SupplierSpend};
pub use supplier_repo::{NewSupplier, SupplierRepository, SupplierRow};
