use serde::{Deserialize, Serialize};

pub type ProductId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Loans repaid in monthly installments
    Credit,
    /// Deposit accounts that earn interest
    Savings,
}

impl ProductType {
    /// Numeric code stored in the database (CREDIT=1, SAVINGS=2).
    pub fn code(&self) -> i64 {
        match self {
            ProductType::Credit => 1,
            ProductType::Savings => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ProductType::Credit),
            2 => Some(ProductType::Savings),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Credit => "credit",
            ProductType::Savings => "savings",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    /// Accepts either the numeric code or the lowercase name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "credit" => Ok(ProductType::Credit),
            "2" | "savings" => Ok(ProductType::Savings),
            other => Err(format!("unknown product type '{}'", other)),
        }
    }
}

/// A financial product offered by the bank. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub product_type: ProductType,
    /// Interest rate in percent, applied once per period (month)
    pub rate: f64,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, product_type: ProductType, rate: f64) -> Self {
        Self {
            id,
            name: name.into(),
            product_type,
            rate,
        }
    }

    pub fn is_credit(&self) -> bool {
        self.product_type == ProductType::Credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_codes_roundtrip() {
        for pt in [ProductType::Credit, ProductType::Savings] {
            assert_eq!(ProductType::from_code(pt.code()), Some(pt));
        }
        assert_eq!(ProductType::from_code(0), None);
        assert_eq!(ProductType::from_code(3), None);
    }

    #[test]
    fn test_product_type_parse() {
        assert_eq!("1".parse::<ProductType>(), Ok(ProductType::Credit));
        assert_eq!("Savings".parse::<ProductType>(), Ok(ProductType::Savings));
        assert!("checking".parse::<ProductType>().is_err());
    }
}
