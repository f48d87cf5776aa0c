//! Read-only package catalogue offered on the package step.
//!
//! The list is embedded at build time from `data/packages.toml`; the wizard
//! never mutates it.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Identifier stored in `selectedPackage` when the family wants a bespoke trip.
pub const CUSTOM_PACKAGE_ID: &str = "custom";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageSummary {
    pub id: String,
    pub name: String,
    pub short_description: String,
    pub duration: String,
    pub adult_price: u32,
    pub child_price: u32,
    pub currency: String,
}

impl PackageSummary {
    /// "From £1899" style label.
    pub fn price_label(&self) -> String {
        let symbol = match self.currency.as_str() {
            "GBP" => "£",
            "EUR" => "€",
            "USD" => "$",
            _ => "",
        };
        if symbol.is_empty() {
            format!("From {} {}", self.adult_price, self.currency)
        } else {
            format!("From {}{}", symbol, self.adult_price)
        }
    }
}

/// One selectable entry on the package step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOption {
    Listed(PackageSummary),
    Custom,
}

impl PackageOption {
    pub fn id(&self) -> &str {
        match self {
            PackageOption::Listed(pkg) => &pkg.id,
            PackageOption::Custom => CUSTOM_PACKAGE_ID,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PackageOption::Listed(pkg) => &pkg.name,
            PackageOption::Custom => "Custom Package",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            PackageOption::Listed(pkg) => &pkg.short_description,
            PackageOption::Custom => {
                "Tell us what you're looking for and we'll create a bespoke itinerary"
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageCatalogue {
    #[serde(default)]
    packages: Vec<PackageSummary>,
}

static BUILTIN: Lazy<PackageCatalogue> = Lazy::new(|| {
    let index = include_str!("../data/packages.toml");
    toml::from_str(index).unwrap_or_default()
});

impl PackageCatalogue {
    pub fn builtin() -> &'static PackageCatalogue {
        &BUILTIN
    }

    pub fn from_packages(packages: Vec<PackageSummary>) -> Self {
        Self { packages }
    }

    pub fn packages(&self) -> &[PackageSummary] {
        &self.packages
    }

    /// Listed packages in catalogue order, then the custom option.
    pub fn options(&self) -> Vec<PackageOption> {
        self.packages
            .iter()
            .cloned()
            .map(PackageOption::Listed)
            .chain(std::iter::once(PackageOption::Custom))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&PackageSummary> {
        self.packages.iter().find(|pkg| pkg.id == id)
    }

    pub fn is_known(&self, id: &str) -> bool {
        id == CUSTOM_PACKAGE_ID || self.find(id).is_some()
    }

    /// Display name for whatever is stored in `selectedPackage`.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        if id == CUSTOM_PACKAGE_ID {
            return "Custom Package";
        }
        self.find(id).map(|pkg| pkg.name.as_str()).unwrap_or(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue_parses() {
        let catalogue = PackageCatalogue::builtin();
        assert_eq!(catalogue.packages().len(), 3);
        let escape = catalogue.find("magical-family-escape").unwrap();
        assert_eq!(escape.adult_price, 1899);
        assert_eq!(escape.price_label(), "From £1899");
    }

    #[test]
    fn options_end_with_custom() {
        let options = PackageCatalogue::builtin().options();
        assert_eq!(options.len(), 4);
        assert_eq!(options.last(), Some(&PackageOption::Custom));
        assert_eq!(options[0].id(), "magical-family-escape");
    }

    #[test]
    fn custom_is_known_but_not_listed() {
        let catalogue = PackageCatalogue::builtin();
        assert!(catalogue.is_known(CUSTOM_PACKAGE_ID));
        assert!(catalogue.find(CUSTOM_PACKAGE_ID).is_none());
        assert!(!catalogue.is_known("northern-lights-cruise"));
        assert_eq!(catalogue.display_name("custom"), "Custom Package");
        assert_eq!(
            catalogue.display_name("santa-express-weekend"),
            "Santa Express Weekend"
        );
    }
}
