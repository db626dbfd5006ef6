use super::TemplateDrop;
use crate::value::Value;

/// Pagination state exposed inside `{% paginate %}`
#[derive(Debug, Clone)]
pub struct PaginateDrop {
    current_page: i64,
    page_size: i64,
    total_items: i64,
}

impl PaginateDrop {
    pub fn new(current_page: i64, page_size: i64, total_items: i64) -> Self {
        Self {
            current_page: current_page.max(1),
            page_size: page_size.max(1),
            total_items: total_items.max(0),
        }
    }

    pub fn pages(&self) -> i64 {
        (self.total_items + self.page_size - 1) / self.page_size
    }

    fn part(title: impl Into<String>, page: i64, is_link: bool) -> Value {
        Value::object([
            ("title", Value::string(title)),
            ("url", Value::string(format!("?page={}", page))),
            ("is_link", Value::Bool(is_link)),
        ])
    }
}

impl TemplateDrop for PaginateDrop {
    fn type_name(&self) -> &'static str {
        "paginate"
    }

    fn get(&self, key: &str) -> Option<Value> {
        Some(match key {
            "current_page" => Value::Int(self.current_page),
            "current_offset" => Value::Int((self.current_page - 1) * self.page_size),
            "page_size" => Value::Int(self.page_size),
            "pages" => Value::Int(self.pages()),
            "items" => Value::Int(self.total_items),
            "previous" => {
                if self.current_page <= 1 {
                    Value::Nil
                } else {
                    Self::part("Previous", self.current_page - 1, true)
                }
            }
            "next" => {
                if self.current_page >= self.pages() {
                    Value::Nil
                } else {
                    Self::part("Next", self.current_page + 1, true)
                }
            }
            "parts" => Value::Array(
                (1..=self.pages())
                    .map(|page| Self::part(page.to_string(), page, page != self.current_page))
                    .collect(),
            ),
            _ => return None,
        })
    }
}
