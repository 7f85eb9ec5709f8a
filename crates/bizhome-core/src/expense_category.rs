//! # Expense Categories
//!
//! Classifies a free-text expense description into a display category.
//!
//! Rules are checked in order against the lowercased description; the first
//! rule with a keyword contained in the text wins. No match gives `Otros`.
//!
//! ```rust
//! use bizhome_core::expense_category::{classify, ExpenseCategory};
//!
//! assert_eq!(classify("Almuerzo con clientes"), ExpenseCategory::Alimentacion);
//! assert_eq!(classify("Pago de internet"), ExpenseCategory::Servicios);
//! assert_eq!(classify("???").icon(), "attach_money");
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Display category of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpenseCategory {
    Alimentacion,
    Transporte,
    Compras,
    Entretenimiento,
    Salud,
    Ropa,
    Hogar,
    Educacion,
    Viajes,
    Servicios,
    Regalos,
    Otros,
}

impl ExpenseCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ExpenseCategory::Alimentacion => "Alimentación",
            ExpenseCategory::Transporte => "Transporte",
            ExpenseCategory::Compras => "Compras",
            ExpenseCategory::Entretenimiento => "Entretenimiento",
            ExpenseCategory::Salud => "Salud",
            ExpenseCategory::Ropa => "Ropa",
            ExpenseCategory::Hogar => "Hogar",
            ExpenseCategory::Educacion => "Educación",
            ExpenseCategory::Viajes => "Viajes",
            ExpenseCategory::Servicios => "Servicios",
            ExpenseCategory::Regalos => "Regalos",
            ExpenseCategory::Otros => "Otros",
        }
    }

    /// Material icon name.
    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Alimentacion => "restaurant",
            ExpenseCategory::Transporte => "directions_car",
            ExpenseCategory::Compras => "shopping_cart",
            ExpenseCategory::Entretenimiento => "sports_esports",
            ExpenseCategory::Salud => "local_hospital",
            ExpenseCategory::Ropa => "checkroom",
            ExpenseCategory::Hogar => "home",
            ExpenseCategory::Educacion => "school",
            ExpenseCategory::Viajes => "flight",
            ExpenseCategory::Servicios => "receipt",
            ExpenseCategory::Regalos => "card_giftcard",
            ExpenseCategory::Otros => "attach_money",
        }
    }

    /// Hex color.
    pub fn color(&self) -> &'static str {
        match self {
            ExpenseCategory::Alimentacion => "#FF7043",
            ExpenseCategory::Transporte => "#5C6BC0",
            ExpenseCategory::Compras => "#66BB6A",
            ExpenseCategory::Entretenimiento => "#AB47BC",
            ExpenseCategory::Salud => "#EC407A",
            ExpenseCategory::Ropa => "#26C6DA",
            ExpenseCategory::Hogar => "#FFA726",
            ExpenseCategory::Educacion => "#7E57C2",
            ExpenseCategory::Viajes => "#42A5F5",
            ExpenseCategory::Servicios => "#78909C",
            ExpenseCategory::Regalos => "#FF6384",
            ExpenseCategory::Otros => "#78909C",
        }
    }

    pub fn label(&self) -> CategoryLabel {
        CategoryLabel {
            name: self.name().to_string(),
            icon: self.icon().to_string(),
            color: self.color().to_string(),
        }
    }
}

/// Serializable name/icon/color triple for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryLabel {
    pub name: String,
    pub icon: String,
    pub color: String,
}

// Order matters: "gasolina" must hit Transporte before "gas" hits Servicios.
const RULES: &[(ExpenseCategory, &[&str])] = &[
    (
        ExpenseCategory::Alimentacion,
        &["comida", "restaurante", "almuerzo", "cena", "desayuno", "menu"],
    ),
    (
        ExpenseCategory::Transporte,
        &["transporte", "gasolina", "auto", "taxi", "uber", "movilización", "bus", "metro"],
    ),
    (
        ExpenseCategory::Compras,
        &["compras", "super", "mercado", "tienda", "supermercado", "abastos"],
    ),
    (
        ExpenseCategory::Entretenimiento,
        &[
            "ocio",
            "entretenimiento",
            "cine",
            "película",
            "netflix",
            "spotify",
            "videojuegos",
            "juegos",
            "fiesta",
            "bar",
        ],
    ),
    (
        ExpenseCategory::Salud,
        &["salud", "farmacia", "doctor", "médico", "hospital", "clinica", "remedio", "medicina"],
    ),
    (
        ExpenseCategory::Ropa,
        &["ropa", "zapatos", "moda", "vestido", "jeans", "accesorios", "bolso", "calzado"],
    ),
    (
        ExpenseCategory::Hogar,
        &[
            "casa",
            "hogar",
            "arriendo",
            "hipoteca",
            "muebles",
            "decoración",
            "electrodomésticos",
            "jardín",
        ],
    ),
    (
        ExpenseCategory::Educacion,
        &[
            "educación",
            "libro",
            "curso",
            "universidad",
            "colegio",
            "escuela",
            "aprendizaje",
            "capacitación",
        ],
    ),
    (
        ExpenseCategory::Viajes,
        &["viaje", "vacaciones", "hotel", "avion", "turismo", "pasaje"],
    ),
    (
        ExpenseCategory::Servicios,
        &["servicios", "luz", "agua", "gas", "internet", "teléfono", "televisión", "streaming"],
    ),
    (
        ExpenseCategory::Regalos,
        &["regalo", "cumpleaños", "aniversario", "navidad", "obsequio"],
    ),
];

/// Classifies an expense description.
pub fn classify(description: &str) -> ExpenseCategory {
    let text = description.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ExpenseCategory::Otros)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        assert_eq!(classify("Gasolina del auto"), ExpenseCategory::Transporte);
        assert_eq!(classify("Cena en el bar"), ExpenseCategory::Alimentacion);
        assert_eq!(classify("Factura de GAS"), ExpenseCategory::Servicios);
    }

    #[test]
    fn test_accented_keywords_and_case() {
        assert_eq!(classify("Consulta MÉDICO"), ExpenseCategory::Salud);
        assert_eq!(classify("Regalo de cumpleaños"), ExpenseCategory::Regalos);
        assert_eq!(classify("Pasaje de avion"), ExpenseCategory::Viajes);
    }

    #[test]
    fn test_fallback() {
        let label = classify("Varios").label();
        assert_eq!(label.name, "Otros");
        assert_eq!(label.icon, "attach_money");
        assert_eq!(label.color, "#78909C");
    }
}
