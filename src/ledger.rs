use crate::storage::repository::{
    BudgetRepository, LineItemRepository, NewLineItem, NewProject, NewSupplier,
    ProjectRepository, SupplierRepository,
};
use log::{error, info};
use sea_orm::DatabaseConnection;

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

/// 空白字符串视为未填写
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(value: &str, field: &'static str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn require_amount(amount: f64) -> Result<f64, LedgerError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}

/// 写入入口：只校验必填项，失败时记日志并返回 false
pub struct Ledger<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> Ledger<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn save_supplier(&self, new: NewSupplier) -> bool {
        report("supplier", self.try_save_supplier(new).await)
    }

    pub async fn save_project(&self, new: NewProject) -> bool {
        report("project", self.try_save_project(new).await)
    }

    pub async fn save_line_item(&self, new: NewLineItem) -> bool {
        report("line item", self.try_save_line_item(new).await)
    }

    pub async fn save_budget(&self, project_id: i32, category: &str, amount: f64) -> bool {
        report(
            "budget allocation",
            self.try_save_budget(project_id, category, amount).await,
        )
    }

    pub async fn delete_project(&self, project_id: i32) -> bool {
        match ProjectRepository::delete(self.db, project_id).await {
            Ok(0) => {
                error!("project {} not found, nothing deleted", project_id);
                false
            }
            Ok(_) => {
                info!("deleted project {} with its entries and budgets", project_id);
                true
            }
            Err(e) => {
                error!("failed to delete project {}: {}", project_id, e);
                false
            }
        }
    }

    pub async fn try_save_supplier(&self, new: NewSupplier) -> Result<i32, LedgerError> {
        let new = NewSupplier {
            name: require(&new.name, "name")?,
            tax_id: non_blank(new.tax_id),
            phone: non_blank(new.phone),
            email: non_blank(new.email),
            address: non_blank(new.address),
        };
        Ok(SupplierRepository::insert(self.db, new).await?)
    }

    pub async fn try_save_project(&self, new: NewProject) -> Result<i32, LedgerError> {
        let new = NewProject {
            name: require(&new.name, "name")?,
            description: non_blank(new.description),
            ..new
        };
        Ok(ProjectRepository::insert(self.db, new).await?)
    }

    pub async fn try_save_line_item(&self, new: NewLineItem) -> Result<i32, LedgerError> {
        let new = NewLineItem {
            category: require(&new.category, "category")?,
            invoiced_amount: require_amount(new.invoiced_amount)?,
            document: non_blank(new.document),
            description: non_blank(new.description),
            ..new
        };
        Ok(LineItemRepository::insert(self.db, new).await?)
    }

    pub async fn try_save_budget(
        &self,
        project_id: i32,
        category: &str,
        amount: f64,
    ) -> Result<(), LedgerError> {
        let category = require(category, "category")?;
        let amount = require_amount(amount)?;
        BudgetRepository::upsert(self.db, project_id, &category, amount).await?;
        Ok(())
    }
}

fn report<T>(what: &str, result: Result<T, LedgerError>) -> bool {
    match result {
        Ok(_) => {
            info!("saved {}", what);
            true
        }
        Err(e) => {
            error!("failed to save {}: {}", what, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::memory_db;
    use crate::storage::entity::{BudgetAllocation, LineItem, Project, Supplier};
    use chrono::NaiveDate;
    use sea_orm::{EntityTrait, PaginatorTrait};

    fn supplier(name: &str, tax_id: &str) -> NewSupplier {
        NewSupplier {
            name: name.into(),
            tax_id: Some(tax_id.into()),
            ..Default::default()
        }
    }

    fn entry(project_id: i32, category: &str, amount: f64) -> NewLineItem {
        NewLineItem {
            project_id,
            entry_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            category: category.into(),
            issue_date: None,
            document: Some("  ".into()),
            supplier_id: None,
            description: None,
            invoiced_amount: amount,
        }
    }

    async fn project(ledger: &Ledger<'_>) -> i32 {
        ledger
            .try_save_project(NewProject {
                name: "Tower".into(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn uniqueness_violation_is_reported_as_false() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        assert!(ledger.save_supplier(supplier("A", "123")).await);
        assert!(!ledger.save_supplier(supplier("B", "123")).await);
    }

    #[tokio::test]
    async fn blank_tax_ids_do_not_collide() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        assert!(ledger.save_supplier(supplier("A", "")).await);
        assert!(ledger.save_supplier(supplier("B", "   ")).await);
        assert_eq!(Supplier::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn presence_is_validated_before_writing() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        assert!(!ledger.save_supplier(supplier(" ", "1")).await);
        assert!(
            !ledger
                .save_project(NewProject {
                    name: String::new(),
                    ..Default::default()
                })
                .await
        );

        let p = project(&ledger).await;
        assert!(matches!(
            ledger.try_save_line_item(entry(p, "", 10.0)).await,
            Err(LedgerError::MissingField("category"))
        ));
        assert!(matches!(
            ledger.try_save_line_item(entry(p, "Glass", f64::NAN)).await,
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(!ledger.save_budget(p, "", 10.0).await);
        assert_eq!(LineItem::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn line_item_requires_existing_project() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        assert!(!ledger.save_line_item(entry(77, "Glass", 10.0)).await);
    }

    #[tokio::test]
    async fn deleting_project_cascades() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        let keep = project(&ledger).await;
        let gone = project(&ledger).await;

        for p in [keep, gone] {
            assert!(ledger.save_line_item(entry(p, "Glass", 10.0)).await);
            assert!(ledger.save_budget(p, "Glass", 100.0).await);
        }

        assert!(ledger.delete_project(gone).await);
        assert!(!ledger.delete_project(gone).await);
        assert_eq!(Project::find().count(&db).await.unwrap(), 1);

        let items = LineItem::find().all(&db).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].project_id, keep);
        assert_eq!(items[0].document, None);

        let budgets = BudgetAllocation::find().all(&db).await.unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].project_id, keep);
    }
}
