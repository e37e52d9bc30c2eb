//! Deterministic synthetic text: personal and company names, street
//! addresses, email handles and authentication failure sentences.
//!
//! All generation is deterministic (same stream seed = same text).

use crate::{model::AuthResult, rng::StreamRng};

/// Deterministic name generator using curated word lists
pub struct NameGenerator;

impl NameGenerator {
    /// Family + middle + given name, e.g. "Nguyen Van An".
    pub fn generate_full_name(rng: &mut StreamRng) -> String {
        let family = Self::pick(rng, Self::family_names());
        let middle = Self::pick(rng, Self::middle_names());
        let given = Self::pick(rng, Self::given_names());
        format!("{family} {middle} {given}")
    }

    /// Company name for organization customers.
    pub fn generate_company_name(rng: &mut StreamRng) -> String {
        let form = Self::pick(rng, Self::company_forms());
        let industry = Self::pick(rng, Self::company_industries());
        // Format: "Form Industry Brand" or "Form Industry Family"
        let brand = if rng.chance(0.5) {
            Self::pick(rng, Self::company_brands())
        } else {
            Self::pick(rng, Self::family_names())
        };
        format!("{form} {industry} {brand}")
    }

    pub fn generate_address(rng: &mut StreamRng) -> String {
        let number = rng.range_inclusive(1, 999);
        let street = Self::pick(rng, Self::streets());
        let ward = rng.range_inclusive(1, 20);
        let city = Self::pick(rng, Self::cities());
        format!("{number} {street}, Ward {ward}, {city}")
    }

    /// Lowercase ASCII handle derived from a name plus a numeric suffix.
    pub fn generate_email(rng: &mut StreamRng, full_name: &str) -> String {
        let handle: String = full_name
            .split_whitespace()
            .map(|part| part.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(".");
        let suffix = rng.next_u64_below(1000);
        let domain = Self::pick(rng, &["gmail.com", "yahoo.com", "outlook.com", "mail.vn"]);
        format!("{handle}{suffix}@{domain}")
    }

    /// A short free-text reason for a non-successful authentication.
    /// Success carries no reason.
    pub fn generate_failure_reason(rng: &mut StreamRng, result: AuthResult) -> String {
        let reasons: &[&str] = match result {
            AuthResult::Success => return String::new(),
            AuthResult::Failed => &[
                "Incorrect one-time code entered",
                "Biometric sample did not match the enrolled template",
                "PIN rejected by the authentication server",
                "Signature verification failed",
                "Security key returned an invalid assertion",
            ],
            AuthResult::Expired => &[
                "One-time code expired before submission",
                "Authentication session timed out",
                "Challenge window elapsed without a response",
            ],
            AuthResult::Cancelled => &[
                "Customer cancelled the confirmation prompt",
                "Authentication abandoned on the device",
                "Customer closed the app during verification",
            ],
        };
        Self::pick(rng, reasons).to_string()
    }

    fn pick(rng: &mut StreamRng, items: &[&'static str]) -> &'static str {
        rng.pick(items).copied().unwrap_or_default()
    }

    fn family_names() -> &'static [&'static str] {
        &[
            "Nguyen", "Tran", "Le", "Pham", "Hoang", "Huynh", "Phan", "Vu", "Vo", "Dang",
            "Bui", "Do", "Ho", "Ngo", "Duong", "Ly", "Truong", "Dinh", "Lam", "Mai",
            "Trinh", "Luong", "Ta", "Cao", "Chau",
        ]
    }

    fn middle_names() -> &'static [&'static str] {
        &[
            "Van", "Thi", "Huu", "Duc", "Minh", "Ngoc", "Thanh", "Quoc", "Xuan", "Thu",
            "Gia", "Bao", "Kim", "Hong", "Anh",
        ]
    }

    fn given_names() -> &'static [&'static str] {
        &[
            "An", "Binh", "Chi", "Dung", "Giang", "Ha", "Hai", "Hanh", "Hieu", "Hoa",
            "Hung", "Huong", "Khanh", "Khoa", "Lan", "Linh", "Long", "Mai", "Nam", "Nga",
            "Nhung", "Phong", "Phuong", "Quan", "Quang", "Son", "Tam", "Thao", "Thang",
            "Trang", "Trung", "Tuan", "Tuyet", "Uyen", "Viet", "Vinh", "Yen",
        ]
    }

    fn company_forms() -> &'static [&'static str] {
        &["Cong ty TNHH", "Cong ty Co phan", "Doanh nghiep Tu nhan", "Tap doan"]
    }

    fn company_industries() -> &'static [&'static str] {
        &[
            "Thuong mai", "Xay dung", "Van tai", "Dich vu", "Cong nghe", "San xuat",
            "Du lich", "Thuc pham", "Dau tu", "Logistics",
        ]
    }

    fn company_brands() -> &'static [&'static str] {
        &[
            "Sao Viet", "Hoa Binh", "Phuong Nam", "Dai Phat", "Thanh Cong", "An Khang",
            "Minh Long", "Hung Thinh", "Tan Tien", "Song Hong",
        ]
    }

    fn streets() -> &'static [&'static str] {
        &[
            "Le Loi", "Nguyen Hue", "Tran Hung Dao", "Hai Ba Trung", "Le Duan",
            "Dien Bien Phu", "Nguyen Trai", "Vo Van Tan", "Pasteur", "Ly Thuong Kiet",
            "Cach Mang Thang Tam", "Hoang Van Thu",
        ]
    }

    fn cities() -> &'static [&'static str] {
        &[
            "Ha Noi", "Ho Chi Minh City", "Da Nang", "Hai Phong", "Can Tho", "Nha Trang",
            "Hue", "Vung Tau",
        ]
    }
}
