use maud::{html, Markup, Render};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonVariant {
    Primary,
    Outline,
    Link,
}

pub struct Button {
    pub text: String,
    pub href: Option<String>,
    pub variant: ButtonVariant,
    pub full_width: bool,
    pub button_type: String,
}

impl Button {
    pub fn primary(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: None,
            variant: ButtonVariant::Primary,
            full_width: false,
            button_type: "submit".to_string(),
        }
    }

    pub fn outline(text: &str) -> Self {
        Self {
            variant: ButtonVariant::Outline,
            ..Self::primary(text)
        }
    }

    pub fn href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn full_width(mut self, full_width: bool) -> Self {
        self.full_width = full_width;
        self
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    fn classes(&self) -> String {
        let variant = match self.variant {
            ButtonVariant::Primary => "bg-indigo-600 hover:bg-indigo-700 active:bg-indigo-800 text-white shadow-sm",
            ButtonVariant::Outline => "bg-transparent hover:bg-gray-50 text-gray-700 border border-gray-200",
            ButtonVariant::Link => "bg-transparent text-blue-500 hover:underline",
        };
        let width = if self.full_width { "w-full" } else { "" };

        format!("{variant} {width} py-2 px-4 font-medium rounded-lg flex items-center justify-center gap-2 cursor-pointer")
    }
}

impl Render for Button {
    fn render(&self) -> Markup {
        let classes = self.classes();

        match &self.href {
            Some(href) => html! {
                a href=(href) class=(classes) { (self.text) }
            },
            None => html! {
                button type=(self.button_type) class=(classes) { (self.text) }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_render_as_anchors() {
        let markup = Button::outline("Continue with GitHub")
            .href("/auth/github")
            .render()
            .into_string();

        assert!(markup.starts_with("<a href=\"/auth/github\""));
        assert!(markup.contains("Continue with GitHub"));
    }

    #[test]
    fn buttons_submit_by_default() {
        let markup = Button::primary("Sign in").render().into_string();
        assert!(markup.contains("type=\"submit\""));
    }
}
