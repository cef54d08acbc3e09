//! Severity-keyed error dispatch
//!
//! One [`ErrorHandler`] is built at process start and shared by handle
//! (`Rc`) with the store, the prompt layer and every command. Handling an
//! error counts it, notifies subscribers in registration order, prints it
//! according to its severity and finally asks the terminator to end the
//! process when the severity demands it.

use crate::error::{ErrorKind, KafkaflowError, Severity};
use colored::Colorize;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Exit status used by CRITICAL errors that carry no exit code
pub const DEFAULT_CRITICAL_EXIT_CODE: i32 = 1;

/// Handle returned by [`ErrorHandler::register`], used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&KafkaflowError)>;

/// What the presentation policy decided for one error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Exit(i32),
}

pub struct ErrorHandler {
    // one ordered list per severity; "all" subscriptions live in every list
    subscribers: RefCell<[Vec<(SubscriptionId, Subscriber)>; 4]>,
    counts: RefCell<[usize; 4]>,
    next_id: Cell<u64>,
    terminator: Box<dyn Fn(i32)>,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::with_terminator(|code| std::process::exit(code))
    }

    /// Builds a handler whose process termination is delegated to `terminator`
    pub fn with_terminator(terminator: impl Fn(i32) + 'static) -> Self {
        Self {
            subscribers: RefCell::new(Default::default()),
            counts: RefCell::new([0; 4]),
            next_id: Cell::new(0),
            terminator: Box::new(terminator),
        }
    }

    /// Subscribes `callback` to one severity, or to all of them when `None`
    pub fn register(
        &self,
        callback: impl Fn(&KafkaflowError) + 'static,
        severity: Option<Severity>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let callback: Subscriber = Rc::new(callback);
        let mut subscribers = self.subscribers.borrow_mut();
        match severity {
            Some(severity) => subscribers[severity.index()].push((id, callback)),
            None => {
                for list in subscribers.iter_mut() {
                    list.push((id, Rc::clone(&callback)));
                }
            }
        }
        id
    }

    /// Removes a subscription from one severity, or from all when `None`.
    /// Unknown ids are ignored.
    pub fn unregister(&self, id: SubscriptionId, severity: Option<Severity>) {
        let mut subscribers = self.subscribers.borrow_mut();
        match severity {
            Some(severity) => subscribers[severity.index()].retain(|(sid, _)| *sid != id),
            None => {
                for list in subscribers.iter_mut() {
                    list.retain(|(sid, _)| *sid != id);
                }
            }
        }
    }

    /// Counts, notifies, presents, and terminates when required
    pub fn handle(&self, error: &KafkaflowError) {
        if let Disposition::Exit(code) = self.dispatch(error) {
            (self.terminator)(code);
        }
    }

    /// Same as [`handle`](Self::handle) but leaves termination to the caller
    pub fn dispatch(&self, error: &KafkaflowError) -> Disposition {
        let index = error.severity.index();
        self.counts.borrow_mut()[index] += 1;

        tracing::debug!(
            severity = %error.severity,
            kind = %error.kind,
            "dispatching error: {}",
            error.message
        );

        // Subscribers may register or handle errors themselves
        let subscribers: Vec<Subscriber> = self.subscribers.borrow()[index]
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for subscriber in subscribers {
            subscriber(error);
        }

        eprintln!("{}", render(error));
        disposition(error)
    }

    /// Handles any error value. Foreign errors are wrapped as a Command
    /// error at ERROR severity with their type name in the details.
    pub fn handle_exception<E>(&self, exc: &E)
    where
        E: std::error::Error + 'static,
    {
        match (exc as &dyn Any).downcast_ref::<KafkaflowError>() {
            Some(error) => self.handle(error),
            None => self.handle(&wrap_foreign(exc)),
        }
    }

    /// Snapshot of how many errors were handled per severity
    pub fn get_error_counts(&self) -> BTreeMap<Severity, usize> {
        let counts = self.counts.borrow();
        Severity::ALL
            .iter()
            .map(|severity| (*severity, counts[severity.index()]))
            .collect()
    }

    pub fn error_count(&self, severity: Severity) -> usize {
        self.counts.borrow()[severity.index()]
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("counts", &self.get_error_counts())
            .finish_non_exhaustive()
    }
}

/// Exit policy: ERROR exits only with an explicit code, CRITICAL always
pub fn disposition(error: &KafkaflowError) -> Disposition {
    match error.severity {
        Severity::Info | Severity::Warning => Disposition::Continue,
        Severity::Error => match error.exit_code {
            Some(code) => Disposition::Exit(code),
            None => Disposition::Continue,
        },
        Severity::Critical => {
            Disposition::Exit(error.exit_code.unwrap_or(DEFAULT_CRITICAL_EXIT_CODE))
        }
    }
}

fn wrap_foreign<E>(exc: &E) -> KafkaflowError
where
    E: std::error::Error + 'static,
{
    let type_name = short_type_name::<E>();
    let message = match exc.to_string() {
        m if m.is_empty() => format!("An unexpected {} occurred", type_name),
        m => m,
    };
    KafkaflowError::new(ErrorKind::Command, message)
        .with_severity(Severity::Error)
        .with_detail("exception_type", type_name)
}

fn short_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Text presentation of an error for its severity
pub fn render(error: &KafkaflowError) -> String {
    let mut out = Vec::new();
    match error.severity {
        Severity::Info => {
            out.push(format!("{} {}", "INFO:".blue(), error.message));
            if let Some(help) = &error.help_text {
                out.push(format!("{} {}", "INFO:".blue(), help));
            }
        }
        Severity::Warning => {
            out.push(format!("{} {}", "WARNING:".yellow(), error.message));
            if let Some(help) = &error.help_text {
                out.push(format!("{} {}", "HELP:".yellow(), help));
            }
        }
        Severity::Error | Severity::Critical => {
            let (title, label) = if error.severity == Severity::Critical {
                ("Critical Error", "CRITICAL ERROR:")
            } else {
                ("Error", "ERROR:")
            };
            out.push(panel(title, label, &error.message));
            if !error.details.is_empty() {
                out.push("Details:".red().to_string());
                for (key, value) in &error.details {
                    out.push(format!("  {} {}", format!("{}:", key).red(), value));
                }
            }
            if let Some(help) = &error.help_text {
                out.push(format!("{} {}", "HELP:".green(), help));
            }
        }
    }
    out.join("\n")
}

fn panel(title: &str, label: &str, message: &str) -> String {
    let lines: Vec<String> = message
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{} {}", label, line)
            } else {
                line.to_string()
            }
        })
        .collect();
    let lines = if lines.is_empty() {
        vec![label.to_string()]
    } else {
        lines
    };

    let title_len = title.chars().count();
    let body_len = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = body_len.max(title_len + 3) + 2;

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(
        format!("╭─ {} {}╮", title, "─".repeat(width - title_len - 3))
            .red()
            .to_string(),
    );
    for line in &lines {
        let pad = " ".repeat(width - line.chars().count() - 2);
        out.push(format!(
            "{} {}{} {}",
            "│".red(),
            line.bold(),
            pad,
            "│".red()
        ));
    }
    out.push(format!("╰{}╯", "─".repeat(width)).red().to_string());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording_handler() -> (ErrorHandler, Rc<RefCell<Vec<i32>>>) {
        let exits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&exits);
        let handler = ErrorHandler::with_terminator(move |code| sink.borrow_mut().push(code));
        (handler, exits)
    }

    #[test]
    fn test_handle_increments_only_its_severity() {
        let (handler, _) = recording_handler();
        handler.handle(&KafkaflowError::general("hi").with_severity(Severity::Warning));

        let counts = handler.get_error_counts();
        assert_eq!(counts[&Severity::Warning], 1);
        assert_eq!(counts[&Severity::Info], 0);
        assert_eq!(counts[&Severity::Error], 0);
        assert_eq!(counts[&Severity::Critical], 0);
    }

    #[test]
    fn test_subscribers_called_once_in_registration_order() {
        let (handler, _) = recording_handler();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let c = Rc::clone(&calls);
        handler.register(move |_| c.borrow_mut().push("info-only"), Some(Severity::Info));
        let c = Rc::clone(&calls);
        handler.register(move |_| c.borrow_mut().push("all"), None);
        let c = Rc::clone(&calls);
        handler.register(move |_| c.borrow_mut().push("warning"), Some(Severity::Warning));
        let c = Rc::clone(&calls);
        handler.register(move |_| c.borrow_mut().push("warning-2"), Some(Severity::Warning));

        handler.handle(&KafkaflowError::general("w").with_severity(Severity::Warning));
        assert_eq!(*calls.borrow(), vec!["all", "warning", "warning-2"]);
    }

    #[test]
    fn test_unregister_all_and_single() {
        let (handler, _) = recording_handler();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let id = handler.register(move |_| h.set(h.get() + 1), None);

        handler.unregister(id, Some(Severity::Info));
        handler.handle(&KafkaflowError::general("i").with_severity(Severity::Info));
        assert_eq!(hits.get(), 0);

        handler.handle(&KafkaflowError::general("w").with_severity(Severity::Warning));
        assert_eq!(hits.get(), 1);

        handler.unregister(id, None);
        handler.handle(&KafkaflowError::general("w").with_severity(Severity::Warning));
        assert_eq!(hits.get(), 1);

        // already gone: no-op
        handler.unregister(id, None);
    }

    #[test]
    fn test_error_exits_only_with_exit_code() {
        let (handler, exits) = recording_handler();
        handler.handle(&KafkaflowError::configuration("bad"));
        assert!(exits.borrow().is_empty());

        handler.handle(&KafkaflowError::configuration("bad").with_exit_code(3));
        assert_eq!(*exits.borrow(), vec![3]);
    }

    #[test]
    fn test_critical_always_exits() {
        let (handler, exits) = recording_handler();
        handler.handle(&KafkaflowError::general("fatal").with_severity(Severity::Critical));
        handler.handle(
            &KafkaflowError::general("fatal")
                .with_severity(Severity::Critical)
                .with_exit_code(4),
        );
        assert_eq!(*exits.borrow(), vec![DEFAULT_CRITICAL_EXIT_CODE, 4]);
    }

    #[test]
    fn test_info_and_warning_never_exit() {
        let err = KafkaflowError::general("x").with_exit_code(9);
        assert_eq!(
            disposition(&err.clone().with_severity(Severity::Info)),
            Disposition::Continue
        );
        assert_eq!(
            disposition(&err.with_severity(Severity::Warning)),
            Disposition::Continue
        );
    }

    #[test]
    fn test_handle_exception_wraps_foreign_errors() {
        let (handler, _) = recording_handler();
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        handler.register(move |e| *s.borrow_mut() = Some(e.clone()), None);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        handler.handle_exception(&io);

        let wrapped = seen.borrow().clone().unwrap();
        assert_eq!(wrapped.kind, ErrorKind::Command);
        assert_eq!(wrapped.severity, Severity::Error);
        assert_eq!(wrapped.message, "denied");
        assert_eq!(wrapped.detail("exception_type"), Some("Error"));
    }

    #[test]
    fn test_handle_exception_passes_taxonomy_errors_through() {
        let (handler, _) = recording_handler();
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        handler.register(move |e| *s.borrow_mut() = Some(e.clone()), None);

        let original = KafkaflowError::validation("bad port", "port").with_severity(Severity::Warning);
        handler.handle_exception(&original);

        assert_eq!(seen.borrow().as_ref(), Some(&original));
        assert_eq!(handler.error_count(Severity::Warning), 1);
    }

    #[test]
    fn test_counts_are_a_snapshot() {
        let (handler, _) = recording_handler();
        let before = handler.get_error_counts();
        handler.handle(&KafkaflowError::general("x").with_severity(Severity::Info));
        assert_eq!(before[&Severity::Info], 0);
        assert_eq!(handler.get_error_counts()[&Severity::Info], 1);
    }

    #[test]
    fn test_subscriber_may_handle_reentrantly() {
        let (handler, _) = recording_handler();
        let handler = Rc::new(handler);
        let inner = Rc::downgrade(&handler);
        handler.register(
            move |_| {
                if let Some(h) = inner.upgrade() {
                    h.handle(&KafkaflowError::general("nested").with_severity(Severity::Info));
                }
            },
            Some(Severity::Warning),
        );
        handler.handle(&KafkaflowError::general("outer").with_severity(Severity::Warning));
        assert_eq!(handler.error_count(Severity::Info), 1);
    }

    #[test]
    fn test_render_error_panel_lists_details_and_help() {
        colored::control::set_override(false);
        let err = KafkaflowError::validation("Profile 'x' does not exist", "profile_name")
            .with_help("Run `kafkaflow profiles list`");
        let text = render(&err);
        assert!(text.contains("ERROR: Profile 'x' does not exist"));
        assert!(text.contains("Details:"));
        assert!(text.contains("field: profile_name"));
        assert!(text.contains("HELP: Run `kafkaflow profiles list`"));
        assert!(text.starts_with("╭─ Error "));
    }

    #[test]
    fn test_render_critical_and_warning() {
        colored::control::set_override(false);
        let critical = KafkaflowError::general("disk on fire").with_severity(Severity::Critical);
        assert!(render(&critical).contains("CRITICAL ERROR: disk on fire"));

        let warning = KafkaflowError::general("careful")
            .with_severity(Severity::Warning)
            .with_help("slow down");
        assert_eq!(render(&warning), "WARNING: careful\nHELP: slow down");
    }
}
