use maud::{html, Markup, Render, DOCTYPE};

pub const SITE_TITLE: &str = "Supabase by example";
const SITE_DESCRIPTION: &str = "Supabase by example showcasing it's auth features.";

pub struct Page {
    pub title: String,
    pub description: Option<String>,
    pub content: Box<dyn Render>,
}

impl Page {
    pub fn new(title: impl Into<String>, content: impl Render + 'static) -> Self {
        Self {
            title: title.into(),
            description: None,
            content: Box::new(content),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Render for Page {
    fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    meta name="description" content=(self.description.as_deref().unwrap_or(SITE_DESCRIPTION));
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    script src="https://unpkg.com/@tailwindcss/browser@4" {}
                }
                body class="min-h-screen bg-gray-50 text-gray-900" {
                    (self.content.render())
                }
            }
        }
    }
}

impl axum::response::IntoResponse for Page {
    fn into_response(self) -> axum::response::Response {
        self.render().into_response()
    }
}

/// Navbar and centred content for signed-in pages
pub struct AppShell {
    pub content: Box<dyn Render>,
}

impl AppShell {
    pub fn new(content: impl Render + 'static) -> Self {
        Self {
            content: Box::new(content),
        }
    }
}

impl Render for AppShell {
    fn render(&self) -> Markup {
        html! {
            main class="flex flex-col min-h-screen" {
                nav class="flex items-center border-b border-gray-300 bg-white px-4 py-3" {
                    div class="flex-1" {
                        h1 class="font-semibold" {
                            a href="/" { (SITE_TITLE) }
                        }
                    }
                    div class="flex items-center gap-10" {
                        a href="/account"
                          class="rounded-lg border border-indigo-300 px-4 py-2 text-indigo-600 hover:bg-gray-50" {
                            "Account"
                        }
                        form class="block" action="/auth/signout" method="post" {
                            button type="submit" class="cursor-pointer hover:underline" { "Sign out" }
                        }
                    }
                }
                div class="grid place-items-center my-10 mx-2" {
                    (self.content.render())
                }
            }
        }
    }
}

/// Centred column for the signed-out auth screens
pub struct AuthPanel {
    pub content: Box<dyn Render>,
}

impl AuthPanel {
    pub fn new(content: impl Render + 'static) -> Self {
        Self {
            content: Box::new(content),
        }
    }
}

impl Render for AuthPanel {
    fn render(&self) -> Markup {
        html! {
            div class="grid place-items-center min-h-screen" {
                div class="w-11/12 rounded-lg bg-white px-6 py-10 shadow-md sm:w-8/12 sm:px-10 md:w-6/12 lg:w-5/12 2xl:w-3/12" {
                    (self.content.render())
                }
            }
        }
    }
}

pub struct Card {
    pub content: Box<dyn Render>,
    pub max_width: Option<String>,
}

impl Card {
    pub fn new(content: impl Render + 'static) -> Self {
        Self {
            content: Box::new(content),
            max_width: None,
        }
    }

    pub fn with_max_width(mut self, max_width: &str) -> Self {
        self.max_width = Some(max_width.to_string());
        self
    }
}

impl Render for Card {
    fn render(&self) -> Markup {
        let width_class = self.max_width.as_deref().unwrap_or("max-w-md");

        html! {
            div class={(width_class) " w-full mx-auto bg-white rounded-xl border border-gray-100 shadow-xl overflow-hidden"} {
                div class="px-8 py-6" {
                    (self.content.render())
                }
            }
        }
    }
}
