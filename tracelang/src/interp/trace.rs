//! Value history of traced variables, annotated with the active call context

use super::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use std::rc::Rc;

/// Label at the bottom of every call-context stack
pub const ROOT_LABEL: &str = "Main";

const SEPARATOR_WIDTH: usize = 38;

/// Stack of call labels, shared between the recorder and live [`CallFrame`]s.
///
/// Never empty: the root label is pushed at construction and no frame owns it.
#[derive(Debug, Clone)]
pub struct CallStack {
    labels: Rc<RefCell<Vec<String>>>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            labels: Rc::new(RefCell::new(vec![ROOT_LABEL.to_string()])),
        }
    }

    /// Push `label`; it is popped again when the returned frame is dropped
    pub fn enter(&self, label: impl Into<String>) -> CallFrame {
        let mut labels = self.labels.borrow_mut();
        labels.push(label.into());
        CallFrame {
            labels: Rc::clone(&self.labels),
            depth: labels.len(),
        }
    }

    pub fn depth(&self) -> usize {
        self.labels.borrow().len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }

    /// Labels joined with ` -> `
    pub fn context(&self) -> String {
        self.labels.borrow().join(" -> ")
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for one pushed call label.
///
/// Dropping it restores the stack to the state before [`CallStack::enter`],
/// whether the call finished normally, returned early, or failed.
#[must_use = "the label is popped as soon as the frame is dropped"]
#[derive(Debug)]
pub struct CallFrame {
    labels: Rc<RefCell<Vec<String>>>,
    depth: usize,
}

impl Drop for CallFrame {
    fn drop(&mut self) {
        let mut labels = self.labels.borrow_mut();
        // frames drop in LIFO order, so this only ever removes our own label
        labels.truncate(self.depth - 1);
    }
}

/// Records every write to a traced variable.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    /// History per traced name; a name is traced iff it has an entry
    histories: BTreeMap<String, Vec<Value>>,
    /// Formatted report lines in chronological order
    lines: Vec<String>,
    stack: CallStack,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracing `name`. Registering an already traced name keeps its history.
    pub fn register(&mut self, name: &str) {
        if !self.histories.contains_key(name) {
            log::debug!("tracing `{name}`");
            self.histories.insert(name.to_string(), Vec::new());
        }
    }

    pub fn has_traced(&self) -> bool {
        !self.histories.is_empty()
    }

    /// Append `value` to the history of `name` if it is traced
    pub fn record(&mut self, name: &str, value: &Value) {
        let Some(history) = self.histories.get_mut(name) else {
            return;
        };
        let context = self.stack.context();
        let line = match history.len() {
            0 => format!("{context} -> {name} {value}"),
            index => format!("{context}@{index} {name} {value}"),
        };
        history.push(value.clone());
        self.lines.push(line);
    }

    pub fn history(&self, name: &str) -> Option<&[Value]> {
        self.histories.get(name).map(Vec::as_slice)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.stack
    }

    /// Push a call label for the duration of the returned frame
    pub fn enter(&self, label: impl Into<String>) -> CallFrame {
        self.stack.enter(label)
    }

    /// Build the report text, or `None` if nothing was ever traced
    pub fn report(&self) -> Option<String> {
        if !self.has_traced() {
            return None;
        }

        let mut out = String::new();
        out.push_str(&"=".repeat(SEPARATOR_WIDTH));
        out.push_str("\nTrace.txt:\n\n");
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        for (name, history) in &self.histories {
            if let Some(last) = history.last() {
                let _ = writeln!(out, "{name}: {last}");
            }
        }
        Some(out)
    }

    /// Write the report to `path` in one write. Returns `false` when there
    /// was nothing to write.
    pub fn write_report(&self, path: &Path) -> io::Result<bool> {
        let Some(report) = self.report() else {
            return Ok(false);
        };
        std::fs::write(path, report)?;
        log::info!("trace report written to {}", path.display());
        Ok(true)
    }
}

/// Call-context label for a function: its name with the first character upper-cased
pub fn call_label(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
