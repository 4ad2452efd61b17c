// Common validation types and traits

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Renders the error in the `field: message` shape clients receive
    pub fn render(&self) -> String {
        format!("{}: {}", self.field, self.message)
    }
}

/// Collects every violated field; validators never stop at the first one
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// `field: message` strings in the order the errors were found
    pub fn into_messages(self) -> Vec<String> {
        self.errors.iter().map(ValidationError::render).collect()
    }
}

pub trait Validator<T> {
    type Output;

    fn validate(&self, data: &T) -> Result<Self::Output, super::ApiError>;
}
