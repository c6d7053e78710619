use lazy_static::lazy_static;
use regex::Regex;

pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";
pub const MAC_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7";
pub const OG_ACCEPT_LANGUAGE: &str = "vi,en;q=0.9";

pub const PUBLIC_DEAL_CACHE_CONTROL: &str = "s-maxage=15, stale-while-revalidate=60";
pub const DEAL_LIST_LIMIT: i64 = 100;
pub const ORDER_PAGE_SIZE_DEFAULT: i64 = 10;
pub const ORDER_PAGE_SIZE_MAX: i64 = 100;
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
pub const BANK_PAYMENT_METHOD: &str = "bank";
pub const VIETQR_IMAGE_BASE: &str = "https://img.vietqr.io/image";

lazy_static! {
    pub static ref PRODUCT_ID_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"shopee\.vn/product/(\d+)/(\d+)").expect("Failed to compile regex pattern"),
        Regex::new(r"product/(\d+)/(\d+)").expect("Failed to compile regex pattern"),
        Regex::new(r"-i\.(\d+)\.(\d+)").expect("Failed to compile regex pattern"),
    ];

    pub static ref CDN_URL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)https?://[a-z0-9.-]*susercontent\.com/file/[^\s"'<>,)]+"#)
            .expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)https?://cf\.shopee\.[a-z.]+/file/[^\s"'<>,)]+"#)
            .expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)https?://deo\.shopeemobile\.com/.*?/file/[^\s"'<>,)]+"#)
            .expect("Failed to compile regex pattern"),
    ];

    pub static ref META_IMAGE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<meta[^>]+property=["']og:image["'][^>]+content=["']?([^"' >]+)["']?"#)
            .expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)<meta[^>]+name=["']twitter:image["'][^>]+content=["']?([^"' >]+)["']?"#)
            .expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)<meta[^>]+property=["']og:image:secure_url["'][^>]+content=["']?([^"' >]+)["']?"#)
            .expect("Failed to compile regex pattern"),
    ];

    pub static ref JSON_IMAGE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)"images"\s*:\s*\[\s*"([^"]+)""#).expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)"image"\s*:\s*\[\s*"([^"]+)""#).expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)"image"\s*:\s*"([^"]+)""#).expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)"cover"\s*:\s*"([^"]+)""#).expect("Failed to compile regex pattern"),
    ];

    pub static ref OG_TITLE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']+)["']"#)
            .expect("Failed to compile regex pattern"),
        Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("Failed to compile regex pattern"),
    ];

    pub static ref OG_IMAGE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<meta[^>]+property=["']og:image["'][^>]+content=["']([^"']+)["']"#)
            .expect("Failed to compile regex pattern"),
        Regex::new(r#"(?i)"image":"(https?://[^"]+)""#).expect("Failed to compile regex pattern"),
    ];
}
