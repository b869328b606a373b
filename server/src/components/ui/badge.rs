use maud::{html, Markup, Render};

pub struct Badge {
    pub text: String,
}

impl Badge {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl Render for Badge {
    fn render(&self) -> Markup {
        html! {
            span class="ml-2 px-2 py-0.5 text-xs font-medium rounded-full bg-gray-100 text-gray-800" {
                (self.text)
            }
        }
    }
}
