//! タグ文字列から表示色を決める
//!
//! 色は表示専用で永続化しない。同じタグは常に同じ色になる。

/// 空タグ用のフォールバック色
pub const TAG_FALLBACK_COLOR: &str = "#9aa0a6";

const SATURATION: u32 = 60;
const LIGHTNESS: u32 = 55;

/// タグを `hsl(h 60% 55%)` 形式の色に変換する
/// 前後の空白と大文字小文字は無視する
pub fn tag_color(tag: &str) -> String {
    let normalized = tag.trim().to_lowercase();
    if normalized.is_empty() {
        return TAG_FALLBACK_COLOR.to_string();
    }

    format!("hsl({} {SATURATION}% {LIGHTNESS}%)", tag_hue(&normalized))
}

/// 任意のタグ（未設定を含む）に色を割り当てる
pub fn optional_tag_color(tag: Option<&str>) -> String {
    tag.map(tag_color)
        .unwrap_or_else(|| TAG_FALLBACK_COLOR.to_string())
}

/// UTF-16 コード単位ごとの `hash * 31 + c` を符号付き32bitで折り返し、
/// 符号なしとして 360 で割った余りを色相とする
fn tag_hue(normalized: &str) -> u32 {
    let hash = normalized
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));
    (hash as u32) % 360
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        // "a" = 97
        assert_eq!(tag_color("a"), "hsl(97 60% 55%)");
        // "ab" = 97 * 31 + 98 = 3105 → 3105 % 360 = 225
        assert_eq!(tag_color("ab"), "hsl(225 60% 55%)");
    }

    #[test]
    fn test_overflowing_hash_uses_unsigned_reduction() {
        // "exam" のハッシュは i32 に収まるが長い文字列は折り返す
        let long = "a very long tag that overflows the thirty two bit hash";
        let hue = tag_hue(long);
        assert!(hue < 360);
        assert_eq!(tag_color(long), format!("hsl({hue} 60% 55%)"));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(tag_color("Foo"), tag_color(" foo "));
        assert_eq!(tag_color("EXAM"), tag_color("exam"));
    }

    #[test]
    fn test_blank_tag_gets_fallback() {
        assert_eq!(tag_color(""), TAG_FALLBACK_COLOR);
        assert_eq!(tag_color("   \t"), TAG_FALLBACK_COLOR);
        assert_eq!(optional_tag_color(None), TAG_FALLBACK_COLOR);
    }

    proptest! {
        #[test]
        fn color_ignores_case_and_surrounding_whitespace(
            tag in "[a-zA-Z0-9 ]{0,24}",
            left in " {0,3}",
            right in " {0,3}",
        ) {
            let padded = format!("{left}{}{right}", tag.to_uppercase());
            prop_assert_eq!(tag_color(&tag), tag_color(&padded));
        }

        #[test]
        fn color_is_always_well_formed(tag in ".{0,40}") {
            let color = tag_color(&tag);
            prop_assert!(color == TAG_FALLBACK_COLOR || color.starts_with("hsl("));
        }
    }
}
