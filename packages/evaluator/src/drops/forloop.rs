use super::TemplateDrop;
use crate::value::Value;

/// Loop metadata for `for` and `tablerow` bodies
#[derive(Debug, Clone)]
pub struct ForloopDrop {
    index0: usize,
    length: usize,
    name: String,
    parentloop: Value,
}

impl ForloopDrop {
    pub fn new(index0: usize, length: usize, name: impl Into<String>, parentloop: Value) -> Self {
        Self {
            index0,
            length,
            name: name.into(),
            parentloop,
        }
    }
}

impl TemplateDrop for ForloopDrop {
    fn type_name(&self) -> &'static str {
        "forloop"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let (index0, length) = (self.index0 as i64, self.length as i64);
        Some(match key {
            "index" => Value::Int(index0 + 1),
            "index0" => Value::Int(index0),
            "rindex" => Value::Int(length - index0),
            "rindex0" => Value::Int(length - index0 - 1),
            "first" => Value::Bool(index0 == 0),
            "last" => Value::Bool(index0 == length - 1),
            "length" => Value::Int(length),
            "name" => Value::string(&self.name),
            "parentloop" => self.parentloop.clone(),
            _ => return None,
        })
    }
}

/// Cell position inside `{% tablerow %}`
#[derive(Debug, Clone)]
pub struct TablerowloopDrop {
    index0: usize,
    length: usize,
    col: usize,
    cols: usize,
    row: usize,
}

impl TablerowloopDrop {
    /// `col` and `row` are 1-based
    pub fn new(index0: usize, length: usize, col: usize, cols: usize, row: usize) -> Self {
        Self {
            index0,
            length,
            col,
            cols,
            row,
        }
    }
}

impl TemplateDrop for TablerowloopDrop {
    fn type_name(&self) -> &'static str {
        "tablerowloop"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let (index0, length) = (self.index0 as i64, self.length as i64);
        let last = index0 == length - 1;
        Some(match key {
            "index" => Value::Int(index0 + 1),
            "index0" => Value::Int(index0),
            "rindex" => Value::Int(length - index0),
            "rindex0" => Value::Int(length - index0 - 1),
            "first" => Value::Bool(index0 == 0),
            "last" => Value::Bool(last),
            "length" => Value::Int(length),
            "col" => Value::Int(self.col as i64),
            "col0" => Value::Int(self.col as i64 - 1),
            "col_first" => Value::Bool(self.col == 1),
            "col_last" => Value::Bool(self.col == self.cols || last),
            "row" => Value::Int(self.row as i64),
            _ => return None,
        })
    }
}
