use std::sync::LazyLock;

use regex::Regex;

use crate::models::Category;

// Pharmacies and drugstores. Checked first: a pharmacy inside a supermarket
// chain is still a medical purchase.
const PHARMACY: &str = r"(?i)(药房|药店|藥局|薬局|薬店|ドラッグ|マツモトキヨシ|サンドラッグ|ウエルシア|スギ薬局|ツルハ|ココカラファイン|pharmacy|drug\s?store|chemist|matsumoto\s?kiyoshi|sundrug|welcia|tsuruha|cocokara|walgreens|watsons|屈臣氏|boots)";

const CONVENIENCE: &str = r"(?i)(便利店|便利商店|コンビニ|セブン|ローソン|ファミリーマート|ファミマ|ミニストップ|デイリーヤマザキ|7-?eleven|seven\s?eleven|711|lawson|罗森|familymart|family\s?mart|全家|ministop|美宜佳|喜士多|快客|circle\s?k)";

const SUPERMARKET: &str = r"(?i)(超市|超级市场|スーパー|イオン|イトーヨーカドー|西友|ライフ|業務スーパー|supermarket|aeon|ito\s?yokado|seiyu|walmart|沃尔玛|costco|开市客|carrefour|家乐福|盒马|永辉|大润发|华润万家|物美|tesco|aldi|lidl)";

const DEPARTMENT_STORE: &str = r"(?i)(百货|百貨|デパート|高島屋|伊勢丹|三越|大丸|松坂屋|阪急|department\s?store|takashimaya|isetan|mitsukoshi|daimaru|sogo|崇光)";

const SHOPPING_CENTER: &str = r"(?i)(购物中心|购物广场|商场|ショッピングセンター|ショッピングモール|モール|ららぽーと|アウトレット|shopping\s?(center|centre|mall)|\bmall\b|outlet|lalaport|万达广场|万象城|大悦城)";

struct Family {
    pattern: Regex,
    category: Category,
}

static FAMILIES: LazyLock<Vec<Family>> = LazyLock::new(|| {
    [
        (PHARMACY, Category::Medical),
        (CONVENIENCE, Category::Food),
        (SUPERMARKET, Category::Food),
        (DEPARTMENT_STORE, Category::Food),
        (SHOPPING_CENTER, Category::Shopping),
    ]
    .into_iter()
    .filter_map(|(pattern, category)| match Regex::new(pattern) {
        Ok(pattern) => Some(Family { pattern, category }),
        Err(e) => {
            tracing::error!("merchant pattern failed to compile: {e}");
            None
        }
    })
    .collect()
});

/// Category override for a merchant name, if one of the merchant families
/// matches. Families are checked in priority order; the first hit wins.
pub fn classify(name: &str) -> Option<Category> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    FAMILIES
        .iter()
        .find(|family| family.pattern.is_match(name))
        .map(|family| family.category)
}

/// Apply the override to a supplied category.
pub fn reclassify(name: &str, supplied: Option<Category>) -> Option<Category> {
    classify(name).or(supplied)
}
