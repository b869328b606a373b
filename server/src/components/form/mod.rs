use maud::{html, Markup, Render};

pub struct InputField {
    pub name: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub input_type: String,
    pub error: Option<String>,
}

impl InputField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            placeholder: None,
            value: None,
            input_type: "text".to_string(),
            error: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn input_type(mut self, input_type: &str) -> Self {
        self.input_type = input_type.to_string();
        self
    }

    pub fn error(mut self, error: Option<&str>) -> Self {
        self.error = error.map(str::to_string);
        self
    }
}

impl Render for InputField {
    fn render(&self) -> Markup {
        html! {
            div class="mb-4" {
                @if let Some(label) = &self.label {
                    label for=(self.name) class="block text-sm font-medium text-gray-700 mb-1" { (label) }
                }
                input
                    type=(self.input_type)
                    name=(self.name)
                    id=(self.name)
                    value=(self.value.as_deref().unwrap_or(""))
                    placeholder=(self.placeholder.as_deref().unwrap_or(""))
                    class="w-full px-4 py-2 border border-gray-300 rounded-lg focus:ring-2 focus:ring-indigo-500 focus:border-indigo-500 text-gray-900";
                (FieldError(self.error.as_deref()))
            }
        }
    }
}

pub struct TextArea {
    pub name: String,
    pub label: String,
    pub value: String,
    pub rows: u8,
    pub error: Option<String>,
}

impl TextArea {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: String::new(),
            rows: 4,
            error: None,
        }
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn error(mut self, error: Option<&str>) -> Self {
        self.error = error.map(str::to_string);
        self
    }
}

impl Render for TextArea {
    fn render(&self) -> Markup {
        html! {
            div class="mb-4" {
                label for=(self.name) class="block text-sm font-medium text-gray-700 mb-1" { (self.label) }
                textarea
                    name=(self.name)
                    id=(self.name)
                    rows=(self.rows)
                    class="w-full px-4 py-2 border border-gray-300 rounded-lg focus:ring-2 focus:ring-indigo-500 focus:border-indigo-500 text-gray-900" {
                    (self.value)
                }
                (FieldError(self.error.as_deref()))
            }
        }
    }
}

/// Message under an input. Renders nothing when there is no error.
pub struct FieldError<'a>(pub Option<&'a str>);

impl Render for FieldError<'_> {
    fn render(&self) -> Markup {
        html! {
            @if let Some(error) = self.0 {
                p class="mt-1 text-sm text-red-600" role="alert" { (error) }
            }
        }
    }
}

pub struct Checkbox {
    pub name: String,
    pub label: String,
    pub checked: bool,
}

impl Checkbox {
    pub fn new(name: &str, label: &str, checked: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            checked,
        }
    }
}

impl Render for Checkbox {
    fn render(&self) -> Markup {
        html! {
            label class="inline-flex items-center gap-2 cursor-pointer text-gray-500" {
                input type="checkbox" name=(self.name) value="on" checked[self.checked] class="rounded border-gray-300";
                (self.label)
            }
        }
    }
}
