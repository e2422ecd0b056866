use crate::ledger::Ledger;
use crate::report::Category;
use crate::storage::repository::{
    BudgetRepository, LineItemRepository, NewLineItem, NewProject, NewSupplier,
    ProjectRepository, SupplierRepository,
};
use chrono::{Duration, NaiveDate};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::DatabaseConnection;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSummary {
    pub suppliers: usize,
    pub projects: usize,
    pub budgets: usize,
    pub entries: usize,
}

struct ProjectPlan {
    name: &'static str,
    start: (i32, u32, u32),
    months: i64,
}

const PROJECTS: [ProjectPlan; 3] = [
    ProjectPlan {
        name: "Alpha Tower (closing)",
        start: (2024, 10, 1),
        months: 6,
    },
    ProjectPlan {
        name: "Beta Offices (in progress)",
        start: (2025, 1, 1),
        months: 4,
    },
    ProjectPlan {
        name: "Gamma Housing (starting)",
        start: (2025, 4, 1),
        months: 1,
    },
];

const SUPPLIER_COUNT: usize = 5;

/// 清空全部数据后生成演示数据
pub async fn run(db: &DatabaseConnection) -> anyhow::Result<SeedSummary> {
    let mut rng = StdRng::from_entropy();
    run_with_rng(db, &mut rng).await
}

pub async fn run_with_rng<R>(db: &DatabaseConnection, rng: &mut R) -> anyhow::Result<SeedSummary>
where
    R: Rng + Send,
{
    wipe(db).await?;

    let ledger = Ledger::new(db);
    let mut summary = SeedSummary::default();

    let mut supplier_ids = Vec::with_capacity(SUPPLIER_COUNT);
    for i in 1..=SUPPLIER_COUNT {
        let id = ledger
            .try_save_supplier(NewSupplier {
                name: format!("Supplier {}", i),
                tax_id: Some(format!("TAX{:04}", i)),
                phone: Some(format!("1111-111{}", i - 1)),
                email: Some(format!("supplier{}@example.com", i)),
                address: Some(format!("{} Builders Road", i)),
            })
            .await?;
        supplier_ids.push(id);
    }
    summary.suppliers = supplier_ids.len();

    for plan in PROJECTS.iter() {
        let start = NaiveDate::from_ymd_opt(plan.start.0, plan.start.1, plan.start.2)
            .ok_or_else(|| anyhow::anyhow!("invalid seed date for {}", plan.name))?;
        let span_days = plan.months * 30;
        let end = start + Duration::days(span_days);

        let project_id = ledger
            .try_save_project(NewProject {
                name: plan.name.to_string(),
                description: Some("Generated project".to_string()),
                start_date: Some(start),
                expected_end_date: Some(end),
            })
            .await?;
        summary.projects += 1;

        for category in Category::ALL {
            let amount = round_cents(rng.gen_range(5_000.0..50_000.0));
            ledger
                .try_save_budget(project_id, category.label(), amount)
                .await?;
            summary.budgets += 1;
        }

        let entries = rng.gen_range(20..=50);
        for _ in 0..entries {
            let entry_date = start + Duration::days(rng.gen_range(0..span_days));
            let category = Category::ALL[rng.gen_range(0..Category::ALL.len())];
            let supplier_id = supplier_ids[rng.gen_range(0..supplier_ids.len())];
            ledger
                .try_save_line_item(NewLineItem {
                    project_id,
                    entry_date,
                    category: category.label().to_string(),
                    issue_date: Some(entry_date),
                    document: Some(format!("DOC{}", rng.gen_range(100..1000))),
                    supplier_id: Some(supplier_id),
                    description: Some(format!("Expense for {}", category)),
                    invoiced_amount: round_cents(rng.gen_range(100.0..10_000.0)),
                })
                .await?;
            summary.entries += 1;
        }
    }

    info!("seed finished: {:?}", summary);
    Ok(summary)
}

async fn wipe(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    LineItemRepository::delete_all(db).await?;
    BudgetRepository::delete_all(db).await?;
    ProjectRepository::delete_all(db).await?;
    SupplierRepository::delete_all(db).await?;
    Ok(())
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
