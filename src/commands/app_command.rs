use crate::report::Category;
use crate::storage::repository::{NewLineItem, NewProject, NewSupplier};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

pub const HELP_TEXT: &str = "可用命令: supplier add name=<..> [tax=..] [phone=..] [email=..] [address=..] | project add name=<..> [desc=..] [start=YYYY-MM-DD] [end=YYYY-MM-DD] | project delete <id> | project <id> | entry add project=<id> date=YYYY-MM-DD category=<..> amount=<..> [issued=..] [doc=..] [supplier=<id>] [desc=..] | budget set <project_id> <category> <amount> | filter <category>|all | seed | export <path> | refresh | quit";

#[derive(Debug, Clone)]
pub enum AppCommand {
    AddSupplier(NewSupplier),
    AddProject(NewProject),
    DeleteProject { id: i32 },
    SelectProject { id: i32 },
    AddEntry(NewLineItem),
    SetBudget {
        project_id: i32,
        category: String,
        amount: f64,
    },
    Filter { category: Option<String> },
    Seed,
    Export { path: String },
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

/// 一行命令拆成位置参数与 key=value 参数，值可用双引号包含空格
#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    named: HashMap<String, String>,
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(\w+)=(?:"([^"]*)"|(\S+))|"([^"]*)"|(\S+)"#).expect("valid token regex")
    })
}

impl Args {
    fn parse(input: &str) -> Self {
        let mut args = Args::default();
        for cap in token_re().captures_iter(input) {
            if let Some(key) = cap.get(1) {
                let value = cap.get(2).or_else(|| cap.get(3)).map_or("", |m| m.as_str());
                args.named
                    .insert(key.as_str().to_ascii_lowercase(), value.to_string());
            } else if let Some(m) = cap.get(4).or_else(|| cap.get(5)) {
                args.positional.push(m.as_str().to_string());
            }
        }
        args
    }

    fn pos(&self, i: usize) -> Option<&str> {
        self.positional.get(i).map(String::as_str)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.named.get(key).cloned()
    }

    fn date(&self, key: &str) -> Result<Option<NaiveDate>, String> {
        match self.named.get(key) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_date(raw)
                .map(Some)
                .ok_or_else(|| format!("日期格式错误 {}={} (应为 YYYY-MM-DD)", key, raw)),
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// 接受 1234.56 / 1234,56 / 1_234.56
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args = Args::parse(s);
        let Some(head) = args.pos(0) else {
            return Ok(AppCommand::Unknown("".to_string()));
        };

        match head {
            "supplier" | "suppliers" => match args.pos(1) {
                Some("add") => Ok(parse_supplier(&args)),
                _ => Ok(AppCommand::Unknown(
                    "用法: supplier add name=<..> [tax=..] [phone=..] [email=..] [address=..]"
                        .to_string(),
                )),
            },
            "project" | "projects" => match args.pos(1) {
                Some("add") => Ok(parse_project(&args)),
                Some("delete") | Some("rm") => match args.pos(2).and_then(|s| s.parse().ok()) {
                    Some(id) => Ok(AppCommand::DeleteProject { id }),
                    None => Ok(AppCommand::Unknown("用法: project delete <id>".to_string())),
                },
                Some(id) => match id.parse::<i32>() {
                    Ok(id) => Ok(AppCommand::SelectProject { id }),
                    Err(_) => Ok(AppCommand::Unknown(format!("未知的 project 子命令: {}", id))),
                },
                None => Ok(AppCommand::Unknown(
                    "用法: project add name=<..> | project delete <id> | project <id>".to_string(),
                )),
            },
            "entry" | "entries" => match args.pos(1) {
                Some("add") => Ok(parse_entry(&args)),
                _ => Ok(AppCommand::Unknown(
                    "用法: entry add project=<id> date=YYYY-MM-DD category=<..> amount=<..>"
                        .to_string(),
                )),
            },
            "budget" => {
                let project_id = args.pos(2).and_then(|s| s.parse::<i32>().ok());
                let category = args.pos(3);
                let amount = args.pos(4).and_then(parse_amount);
                match (args.pos(1), project_id, category, amount) {
                    (Some("set"), Some(project_id), Some(category), Some(amount)) => {
                        Ok(AppCommand::SetBudget {
                            project_id,
                            category: Category::normalize(category),
                            amount,
                        })
                    }
                    _ => Ok(AppCommand::Unknown(
                        "用法: budget set <project_id> <category> <amount>".to_string(),
                    )),
                }
            }
            "filter" => match args.pos(1) {
                None | Some("all") | Some("clear") => Ok(AppCommand::Filter { category: None }),
                Some(_) => {
                    let raw = args.positional[1..].join(" ");
                    Ok(AppCommand::Filter {
                        category: Some(Category::normalize(&raw)),
                    })
                }
            },
            "seed" => Ok(AppCommand::Seed),
            "export" => match args.pos(1) {
                Some(path) => Ok(AppCommand::Export {
                    path: path.to_string(),
                }),
                None => Ok(AppCommand::Unknown("用法: export <path>".to_string())),
            },
            "refresh" | "r" => Ok(AppCommand::Refresh),
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            other => Ok(AppCommand::Unknown(format!("未知命令: {}", other))),
        }
    }
}

fn parse_supplier(args: &Args) -> AppCommand {
    match args.get("name") {
        Some(name) => AppCommand::AddSupplier(NewSupplier {
            name,
            tax_id: args.get("tax"),
            phone: args.get("phone"),
            email: args.get("email"),
            address: args.get("address"),
        }),
        None => AppCommand::Unknown("供应商名称必填: supplier add name=<..>".to_string()),
    }
}

fn parse_project(args: &Args) -> AppCommand {
    let Some(name) = args.get("name") else {
        return AppCommand::Unknown("项目名称必填: project add name=<..>".to_string());
    };
    let dates = args.date("start").and_then(|s| Ok((s, args.date("end")?)));
    match dates {
        Ok((start_date, expected_end_date)) => AppCommand::AddProject(NewProject {
            name,
            description: args.get("desc"),
            start_date,
            expected_end_date,
        }),
        Err(msg) => AppCommand::Unknown(msg),
    }
}

fn parse_entry(args: &Args) -> AppCommand {
    let usage = "用法: entry add project=<id> date=YYYY-MM-DD category=<..> amount=<..> [issued=..] [doc=..] [supplier=<id>] [desc=..]";

    let project_id = args.get("project").and_then(|s| s.parse::<i32>().ok());
    let entry_date = args.get("date").as_deref().and_then(parse_date);
    let category = args.get("category");
    let amount = args.get("amount").as_deref().and_then(parse_amount);
    let (Some(project_id), Some(entry_date), Some(category), Some(invoiced_amount)) =
        (project_id, entry_date, category, amount)
    else {
        return AppCommand::Unknown(usage.to_string());
    };

    let issue_date = match args.date("issued") {
        Ok(d) => d,
        Err(msg) => return AppCommand::Unknown(msg),
    };
    let supplier_id = match args.get("supplier") {
        None => None,
        Some(raw) => match raw.parse::<i32>() {
            Ok(id) => Some(id),
            Err(_) => return AppCommand::Unknown(format!("供应商 ID 无效: {}", raw)),
        },
    };

    AppCommand::AddEntry(NewLineItem {
        project_id,
        entry_date,
        category: Category::normalize(&category),
        issue_date,
        document: args.get("doc"),
        supplier_id,
        description: args.get("desc"),
        invoiced_amount,
    })
}
