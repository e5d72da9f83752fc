//! 用户消息通知
//!
//! 模型不直接弹对话框，所有面向用户的提示走这个 trait；
//! 测试用 NullNotifier 静默，嵌入方接上自己的对话框实现

use std::error::Error;

pub trait Notifier: Send + Sync {
    fn show_info(&self, title: &str, message: &str);

    fn show_warning(&self, title: &str, message: &str, cause: Option<&dyn Error>);
}

/// 静默实现，测试用
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn show_info(&self, _title: &str, _message: &str) {}

    fn show_warning(&self, _title: &str, _message: &str, _cause: Option<&dyn Error>) {}
}

/// 写入日志的实现，无界面环境的默认选择
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_info(&self, title: &str, message: &str) {
        tracing::info!(title = title, "{}", message);
    }

    fn show_warning(&self, title: &str, message: &str, cause: Option<&dyn Error>) {
        match cause {
            Some(cause) => tracing::warn!(title = title, cause = %cause, "{}", message),
            None => tracing::warn!(title = title, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_notifier_is_silent() {
        let notifier = NullNotifier;
        notifier.show_info("title", "message");
        notifier.show_warning("title", "message", None);
    }

    #[test]
    fn test_notifier_is_object_safe() {
        let notifier: Box<dyn Notifier> = Box::new(NullNotifier);
        notifier.show_info("t", "m");
    }
}
