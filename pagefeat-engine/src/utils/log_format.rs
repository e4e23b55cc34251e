use std::fmt::{self, Write};

// ======================== 零堆分配字符串预览 ========================
/// 空白字符折叠 + 截断 - 零堆分配的日志预览
/// 用于日志中输出可能很长的地址/模式
#[inline(always)]
pub fn preview_compact(s: &str, max_len: usize) -> impl fmt::Display + '_ {
    struct CompactView<'a> {
        source: &'a str,
        max_length: usize,
    }

    impl fmt::Display for CompactView<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut char_count = 0;
            let mut last_was_whitespace = false;

            for ch in self.source.chars() {
                if char_count >= self.max_length {
                    f.write_str("…")?;
                    break;
                }

                if ch.is_whitespace() {
                    if !last_was_whitespace {
                        f.write_char(' ')?;
                        char_count += 1;
                        last_was_whitespace = true;
                    }
                } else {
                    f.write_char(ch)?;
                    char_count += 1;
                    last_was_whitespace = false;
                }
            }
            Ok(())
        }
    }

    CompactView {
        source: s,
        max_length: max_len,
    }
}

/// 地址日志预览默认长度
pub const URL_PREVIEW_LEN: usize = 96;

/// 地址日志预览（默认长度）
#[inline(always)]
pub fn preview_url(url: &str) -> impl fmt::Display + '_ {
    preview_compact(url, URL_PREVIEW_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_compact_truncates_and_folds() {
        assert_eq!(preview_compact("a  b\n\tc", 10).to_string(), "a b c");
        assert_eq!(preview_compact("abcdef", 3).to_string(), "abc…");
        assert_eq!(preview_compact("abc", 3).to_string(), "abc");
    }
}
