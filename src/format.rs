//! Address formatting functionality.

/// Fixed delimiter between address qualifiers.
const DELIMITER: &str = ", ";

/// Composes raw address fragments with region qualifiers into a single
/// fully-qualified query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFormat {
    country: String,
    province: String,
    city: String,
}

impl AddressFormat {
    /// Create a formatter with the default qualifiers
    /// (Russia / Kirov Oblast / Kirov).
    pub fn new() -> Self {
        Self {
            country: "Russia".to_string(),
            province: "Kirov Oblast".to_string(),
            city: "Kirov".to_string(),
        }
    }

    /// Set the country qualifier.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Set the province qualifier.
    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = province.into();
        self
    }

    /// Set the city qualifier.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Compose a raw address fragment into a fully-qualified address string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use geobatch::AddressFormat;
    ///
    /// let format = AddressFormat::new();
    /// assert_eq!(
    ///     format.format("Lenina 25"),
    ///     "Russia, Kirov Oblast, Kirov, Lenina 25"
    /// );
    /// ```
    pub fn format(&self, raw_address: &str) -> String {
        [
            self.country.as_str(),
            self.province.as_str(),
            self.city.as_str(),
            raw_address,
        ]
        .join(DELIMITER)
    }
}

impl Default for AddressFormat {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let format = AddressFormat::new();
        assert_eq!(
            format.format("Baramzy, Troitskaya 3"),
            "Russia, Kirov Oblast, Kirov, Baramzy, Troitskaya 3"
        );
    }

    #[test]
    fn test_override_changes_only_that_field() {
        let format = AddressFormat::new().with_city("Slobodskoy");
        assert_eq!(
            format.format("Sovetskaya 1"),
            "Russia, Kirov Oblast, Slobodskoy, Sovetskaya 1"
        );

        let format = AddressFormat::new()
            .with_country("Belarus")
            .with_province("Minsk Region")
            .with_city("Minsk");
        assert_eq!(
            format.format("Lenina 2"),
            "Belarus, Minsk Region, Minsk, Lenina 2"
        );
    }
}
