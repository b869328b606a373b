use maud::{html, Markup, Render};

pub struct Heading {
    pub text: String,
    pub level: HeadingLevel,
    pub classes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingLevel {
    H1,
    H2,
}

impl Heading {
    pub fn h1(text: &str) -> Self {
        Self {
            text: text.to_string(),
            level: HeadingLevel::H1,
            classes: None,
        }
    }

    pub fn h2(text: &str) -> Self {
        Self {
            level: HeadingLevel::H2,
            ..Self::h1(text)
        }
    }

    pub fn with_classes(mut self, classes: &str) -> Self {
        self.classes = Some(classes.to_string());
        self
    }
}

impl Render for Heading {
    fn render(&self) -> Markup {
        let default_classes = match self.level {
            HeadingLevel::H1 => "font-semibold text-4xl mb-4",
            HeadingLevel::H2 => "font-semibold text-2xl mb-2",
        };
        let classes = format!(
            "{default_classes} {}",
            self.classes.as_deref().unwrap_or("")
        );

        match self.level {
            HeadingLevel::H1 => html! { h1 class=(classes) { (self.text) } },
            HeadingLevel::H2 => html! { h2 class=(classes) { (self.text) } },
        }
    }
}
