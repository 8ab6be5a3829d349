use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::models::{CycleResult, Report};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportLanguage {
    #[default]
    Es,
    En,
}

struct Labels {
    header: &'static str,
    product: &'static str,
    price: &'static str,
    stock: &'static str,
    changed: &'static str,
    yes: &'static str,
    no: &'static str,
    subject_changes: &'static str,
    subject_status: &'static str,
}

const SPANISH: Labels = Labels {
    header: "Reporte diario de productos:",
    product: "Producto",
    price: "Precio",
    stock: "Stock",
    changed: "Cambio detectado",
    yes: "Sí",
    no: "No",
    subject_changes: "Cambios detectados en productos",
    subject_status: "Estado diario de productos",
};

const ENGLISH: Labels = Labels {
    header: "Daily product report:",
    product: "Product",
    price: "Price",
    stock: "Stock",
    changed: "Change detected",
    yes: "Yes",
    no: "No",
    subject_changes: "Changes detected in products",
    subject_status: "Daily product status",
};

impl ReportLanguage {
    fn labels(&self) -> &'static Labels {
        match self {
            ReportLanguage::Es => &SPANISH,
            ReportLanguage::En => &ENGLISH,
        }
    }
}

/// Renders one cycle's results as a single plain-text message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportBuilder {
    language: ReportLanguage,
}

impl ReportBuilder {
    pub fn new(language: ReportLanguage) -> Self {
        Self { language }
    }

    /// Results are rendered in the order given, which is the configured
    /// product order. The subject flags the whole cycle: any changed item
    /// selects the "changes detected" subject.
    pub fn build(&self, results: &[CycleResult]) -> Report {
        let labels = self.language.labels();

        let mut body = String::new();
        let _ = write!(body, "{}\n\n", labels.header);
        for result in results {
            let _ = writeln!(body, "{}: {}", labels.product, result.url);
            let _ = writeln!(body, "{}: {}", labels.price, result.price_raw);
            let _ = writeln!(body, "{}: {}", labels.stock, result.stock);
            let flag = if result.changed { labels.yes } else { labels.no };
            let _ = write!(body, "{}: {}\n\n", labels.changed, flag);
        }

        let subject = if results.iter().any(|r| r.changed) {
            labels.subject_changes
        } else {
            labels.subject_status
        };

        Report {
            subject: subject.to_string(),
            body,
        }
    }
}
