use rusqlite::types::Value;

/// Accumulates SQL text and the bind parameters for its `?` placeholders.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    pub fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub fn bind(&mut self, value: Value) {
        self.sql.push('?');
        self.params.push(value);
    }

    /// Write `items` separated by `sep`
    pub fn join<T>(&mut self, items: &[T], sep: &str, mut each: impl FnMut(&T, &mut Self)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            each(item, self);
        }
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}
