//! 模式结构分析：遍历正则HIR提取结构画像
//! 骨架串只保留必现字面量，变长/可变内容以占位符表示，可选内容直接省略

use regex_syntax::{
    hir::{Class, Hir, HirKind, Look},
    Parser,
};

use crate::core::PatternProfile;
use crate::error::{CoreError, CoreResult};

/// 骨架占位符（变长内容）
const HOLE: char = '\u{0}';
/// Unicode字符类覆盖码点数超过该值即视为通配
const BROAD_UNICODE_CLASS: u32 = 0xFFFF;
/// 字节字符类覆盖字节数超过该值即视为通配
const BROAD_BYTE_CLASS: u32 = 128;

/// 解析正则并提取结构画像
pub fn analyze_regex(pattern: &str) -> CoreResult<PatternProfile> {
    let hir = Parser::new()
        .parse(pattern)
        .map_err(|e| CoreError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
    Ok(analyze_hir(&hir))
}

/// 从HIR提取结构画像
pub fn analyze_hir(hir: &Hir) -> PatternProfile {
    let mut walker = ProfileWalker::default();
    walker.walk(hir);

    let skeleton = walker.skeleton;
    // `?`与`&`同样视为段分隔符，查询键名按段计数
    let literal_segments = skeleton
        .split(&['/', '?', '&'][..])
        .filter(|seg| !seg.is_empty() && !seg.contains(HOLE))
        .count() as u32;

    PatternProfile {
        literal_segments,
        literal_chars: walker.literal_chars,
        wildcards: walker.wildcards,
        has_query_constraint: has_query_constraint(&skeleton),
        captures: hir.properties().explicit_captures_len() as u32,
        anchored_start: walker.anchored_start,
        anchored_end: walker.end_anchor_at == Some(skeleton.len()),
    }
}

/// 骨架中出现字面量`?`且其后紧跟字面量键名
fn has_query_constraint(skeleton: &str) -> bool {
    skeleton.match_indices('?').any(|(idx, _)| {
        skeleton[idx + 1..]
            .chars()
            .next()
            .is_some_and(|c| c != HOLE && c != '&' && c != '#')
    })
}

#[derive(Default)]
struct ProfileWalker {
    skeleton: String,
    literal_chars: u32,
    wildcards: u32,
    anchored_start: bool,
    end_anchor_at: Option<usize>,
}

impl ProfileWalker {
    fn walk(&mut self, hir: &Hir) {
        match hir.kind() {
            HirKind::Empty => {}
            HirKind::Literal(lit) => {
                let text = String::from_utf8_lossy(&lit.0);
                self.literal_chars += text.chars().count() as u32;
                self.skeleton.push_str(&text);
            }
            HirKind::Class(class) => {
                if is_broad_class(class) {
                    self.wildcards += 1;
                }
                self.skeleton.push(HOLE);
            }
            HirKind::Look(look) => match look {
                Look::Start | Look::StartLF | Look::StartCRLF => {
                    if self.skeleton.is_empty() {
                        self.anchored_start = true;
                    }
                }
                Look::End | Look::EndLF | Look::EndCRLF => {
                    self.end_anchor_at = Some(self.skeleton.len());
                }
                _ => {}
            },
            HirKind::Repetition(rep) => {
                if rep.max.is_none() {
                    // 无上界量词：`*` `+` `{n,}`
                    self.wildcards += 1;
                    self.skeleton.push(HOLE);
                } else if rep.min > 0 {
                    self.skeleton.push(HOLE);
                }
                // 有上界的可选内容不是必现内容，骨架中省略
            }
            HirKind::Capture(cap) => self.walk(&cap.sub),
            HirKind::Concat(subs) => {
                for sub in subs {
                    self.walk(sub);
                }
            }
            HirKind::Alternation(_) => self.skeleton.push(HOLE),
        }
    }
}

fn is_broad_class(class: &Class) -> bool {
    match class {
        Class::Unicode(cls) => {
            let span: u32 = cls
                .ranges()
                .iter()
                .map(|r| r.end() as u32 - r.start() as u32 + 1)
                .sum();
            span > BROAD_UNICODE_CLASS
        }
        Class::Bytes(cls) => {
            let span: u32 = cls
                .ranges()
                .iter()
                .map(|r| r.end() as u32 - r.start() as u32 + 1)
                .sum();
            span > BROAD_BYTE_CLASS
        }
    }
}
