pub mod budget_allocation;
pub mod line_item;
pub mod project;
pub mod supplier;

pub use budget_allocation::Entity as BudgetAllocation;
pub use line_item::Entity as LineItem;
pub use project::Entity as Project;
pub use supplier::Entity as Supplier;
