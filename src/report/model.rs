use crate::storage::repository::{CategorySpend, MonthlySpend, SupplierSpend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 界面约定的 8 个预算分类，顺序即报表展示顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Aluminum,
    Material,
    Paint,
    Glass,
    Finishing,
    Design,
    AdvancePayments,
    Installation,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Aluminum,
        Category::Material,
        Category::Paint,
        Category::Glass,
        Category::Finishing,
        Category::Design,
        Category::AdvancePayments,
        Category::Installation,
    ];

    /// 存入数据库的标签
    pub fn label(&self) -> &'static str {
        match self {
            Category::Aluminum => "Aluminum",
            Category::Material => "Material",
            Category::Paint => "Paint",
            Category::Glass => "Glass",
            Category::Finishing => "Finishing",
            Category::Design => "Design",
            Category::AdvancePayments => "AdvancePayments",
            Category::Installation => "Installation",
        }
    }

    /// 能识别就换成标准标签，否则原样保留（数据层不做强制）
    pub fn normalize(raw: &str) -> String {
        raw.parse::<Category>()
            .map(|c| c.label().to_string())
            .unwrap_or_else(|_| raw.trim().to_string())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "aluminum" | "aluminium" => Ok(Category::Aluminum),
            "material" => Ok(Category::Material),
            "paint" => Ok(Category::Paint),
            "glass" => Ok(Category::Glass),
            "finishing" => Ok(Category::Finishing),
            "design" => Ok(Category::Design),
            "advancepayments" | "advances" => Ok(Category::AdvancePayments),
            "installation" => Ok(Category::Installation),
            _ => Err(format!("unknown category: {}", s.trim())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryVariance {
    pub category: String,
    pub budgeted: f64,
    pub spent: f64,
    pub variance: f64,
}

impl CategoryVariance {
    pub fn new(category: impl Into<String>, budgeted: f64, spent: f64) -> Self {
        Self {
            category: category.into(),
            budgeted,
            spent,
            variance: budgeted - spent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectComparison {
    pub project_id: i32,
    pub project: String,
    pub total_budget: f64,
    pub total_spent: f64,
}

/// 看板快照：选中项目 + 分类筛选下的全部报表
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub project_id: Option<i32>,
    pub category_filter: Option<String>,
    pub projects: Vec<ProjectComparison>,
    pub by_category: Vec<CategorySpend>,
    pub by_supplier: Vec<SupplierSpend>,
    pub monthly: Vec<MonthlySpend>,
    pub project_budget_total: f64,
    pub project_spent_total: f64,
    pub variance: Vec<CategoryVariance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_spellings() {
        assert_eq!(
            "advance-payments".parse::<Category>(),
            Ok(Category::AdvancePayments)
        );
        assert_eq!(
            "Advance_Payments".parse::<Category>(),
            Ok(Category::AdvancePayments)
        );
        assert_eq!(" GLASS ".parse::<Category>(), Ok(Category::Glass));
        assert!("scaffolding".parse::<Category>().is_err());
    }

    #[test]
    fn normalize_keeps_unknown_text() {
        assert_eq!(Category::normalize("paint"), "Paint");
        assert_eq!(Category::normalize(" Scaffolding "), "Scaffolding");
    }

    #[test]
    fn variance_is_budget_minus_spend() {
        let v = CategoryVariance::new("Glass", 100.0, 130.0);
        assert_eq!(v.variance, -30.0);
    }
}
