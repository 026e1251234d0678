/// Two-decimal number with an explicit `+` on non-negative values.
/// Two decimals with an explicit sign. Zero, negative zero included, is `+`.
pub fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}", value.abs())
    } else {
        format!("{value:.2}")
    }
}

pub fn signed_pct(value: f64) -> String {
    format!("{}%", signed(value))
}

/// Dollar amount with thousands separators and two decimals.
pub fn currency(value: f64) -> String {
    let text = format!("{:.2}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && text != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Width of a confidence bar fill, e.g. `72.50%`.
pub fn bar_width(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationBand {
    Low,
    Medium,
    High,
}

impl CorrelationBand {
    pub fn classify(value: f64) -> Self {
        let magnitude = value.abs();
        if magnitude > 0.7 {
            CorrelationBand::High
        } else if magnitude > 0.3 {
            CorrelationBand::Medium
        } else {
            CorrelationBand::Low
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            CorrelationBand::Low => "corr-low",
            CorrelationBand::Medium => "corr-medium",
            CorrelationBand::High => "corr-high",
        }
    }
}
