//! User-facing conversation text (Spanish)

// =============================================================================
// CONVERSATION
// =============================================================================

pub const WELCOME: &str = "Hola, gracias por escribirnos. ¿Qué tipo de evento quieres organizar?";
pub const BUDGET_QUESTION: &str = "¿Cuál es tu presupuesto estimado en USD?";
pub const CONTACT_QUESTION: &str =
    "Perfecto. ¿Me compartes tu nombre y un email o teléfono de contacto?";
pub const EVALUATION_HEADER: &str = "\n--- Evaluando tu solicitud ---";
pub const QUALIFIED_SUCCESS: &str = "¡Perfecto!";
pub const QUALIFIED_SUMMARY: &str = "Resumen de tu solicitud:";
pub const CONTACT_FOLLOWUP: &str = "\nPronto te contactará nuestro equipo comercial.";
pub const CONVERSATION_END: &str = "\n--- Conversación terminada ---";
pub const NOT_SPECIFIED: &str = "No especificado";

// =============================================================================
// EVENT TYPE
// =============================================================================

pub const EVENT_ROUTE_QUESTION: &str = "¿Tu evento es corporativo?";
pub const EVENT_ROUTE_OPTIONS: [&str; 3] = [
    "1. Sí - Es un evento corporativo",
    "2. No - No es un evento corporativo",
    "3. Describe tu evento para que podamos clasificarlo",
];
pub const EVENT_ROUTE_PROMPT: &str = "Selecciona una opción (1/2/3 o sí/no/describir)";
pub const EVENT_ROUTE_INVALID: &str =
    "Por favor, selecciona una opción válida (1/2/3 o sí/no/describir).";
pub const DESCRIBE_PROMPT: &str = "Describe tu evento";
pub const DESCRIBE_EMPTY: &str = "Por favor, proporciona una descripción del evento.";
pub const CORPORATE_EVENT_TYPE_INPUT: &str =
    "¿Qué tipo de evento corporativo es? (ej: conferencia, lanzamiento, team building)";
pub const EVENT_TYPE_INPUT: &str = "¿Qué tipo de evento es? (ej: boda, cumpleaños, graduación)";
pub const ANALYZING_DESCRIPTION: &str = "Analizando la descripción de tu evento...";
pub const DESCRIPTION_CORPORATE: &str = "Tu evento parece ser corporativo.";
pub const DESCRIPTION_NOT_CORPORATE: &str = "Tu evento no parece ser corporativo.";
pub const CLASSIFIER_UNAVAILABLE: &str =
    "No podemos analizar la descripción automáticamente en este momento.";
pub const MANUAL_CLASSIFICATION_PROMPT: &str = "Por favor, indícanos manualmente:";
pub const MANUAL_CORPORATE_QUESTION: &str = "¿Es corporativo? (sí/no)";

// =============================================================================
// COLLECTOR PROMPTS
// =============================================================================

pub const BUDGET_PROMPT: &str = "Respuesta";
pub const NAME_PROMPT: &str = "Nombre";
pub const CONTACT_PROMPT: &str = "Email o teléfono de contacto";

// =============================================================================
// ERRORS
// =============================================================================

pub const NOT_CORPORATE: &str =
    "Lo sentimos, nuestro trabajo se enfoca principalmente en eventos corporativos.";
pub const MISSING_NAME: &str = "Ingresa tu nombre.";
pub const MISSING_CONTACT: &str = "Ingresa tu email o teléfono de contacto.";
pub const INVALID_INPUT: &str = "Por favor, ingresa un valor válido.";
pub const INVALID_NUMBER: &str = "Por favor, ingresa un número válido.";
pub const INVALID_CONTACT: &str = "Por favor, ingresa un email válido (ej: usuario@ejemplo.com) o un teléfono válido (ej: +1234567890).";

pub fn insufficient_budget(min_budget: f64) -> String {
    format!(
        "Lo sentimos, no podemos trabajar con presupuestos menores a ${} USD.",
        format_thousands(min_budget, 0)
    )
}

pub fn invalid_choice(choices: &[String]) -> String {
    format!("Por favor, elige una de estas opciones: {}", choices.join(", "))
}

pub fn min_value(min_value: f64) -> String {
    format!("Por favor, ingresa un valor mayor o igual a {:?}.", min_value)
}

/// Format with comma thousands separators and a fixed number of decimals
///
/// `format_thousands(1234567.891, 2)` gives `1,234,567.89`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
