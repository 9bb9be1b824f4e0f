//! Maud page templates for the forum UI.

use std::collections::BTreeMap;

use maud::{html, Markup, DOCTYPE};

use crate::db::{Post, Reply, User};

/// Base HTML layout with the shared navigation chrome.
fn base(title: &str, user: Option<&User>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="color-scheme" content="light dark";
                title { (title) " - Starling Forum" }
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";
                link rel="stylesheet" href="/static/css/style.css";
            }
            body {
                header class="container" {
                    nav {
                        ul {
                            li { a href="/" { strong { "Starling Forum" } } }
                        }
                        ul {
                            li { a href="/forum_post" { "Forum" } }
                            li { a href="/exchange_rates" { "Exchange Rates" } }
                            @if let Some(u) = user {
                                li { a href="/dashboard" { (u.username) } }
                                li { a href="/logout" { "Log out" } }
                            } @else {
                                li { a href="/login" { "Log in" } }
                                li { a href="/signup" { "Sign up" } }
                            }
                        }
                    }
                }
                main class="container" {
                    (content)
                }
                footer class="container" {
                    small { "Starling Forum" }
                }
            }
        }
    }
}

fn error_banner(error: Option<&str>) -> Markup {
    html! {
        @if let Some(e) = error {
            p class="error-banner" role="alert" { (e) }
        }
    }
}

/// Render the public home page.
#[must_use]
pub fn home_page(user: Option<&User>) -> Markup {
    base(
        "Home",
        user,
        html! {
            h1 { "Welcome to Starling Forum" }
            p { "A small forum for posts and replies, with a currency exchange-rate lookup on the side." }
            ul {
                li { a href="/forum_post" { "Browse the forum" } }
                li { a href="/exchange_rates" { "Exchange rates" } }
            }
        },
    )
}

/// Render the login page. `error` becomes the dedicated failure banner.
#[must_use]
pub fn login_page(error: Option<&str>) -> Markup {
    base(
        "Login",
        None,
        html! {
            article class="auth-container" {
                h1 { "Login" }
                (error_banner(error))
                form method="post" action="/login" {
                    label for="username" { "Username" }
                    input type="text" name="username" id="username" required;
                    label for="password" { "Password" }
                    input type="password" name="password" id="password" required;
                    button type="submit" { "Login" }
                }
                p {
                    "Don't have an account? "
                    a href="/signup" { "Sign up" }
                }
            }
        },
    )
}

/// Render the signup page.
#[must_use]
pub fn signup_page(error: Option<&str>) -> Markup {
    base(
        "Sign up",
        None,
        html! {
            article class="auth-container" {
                h1 { "Sign up" }
                (error_banner(error))
                form method="post" action="/signup" {
                    label for="username" { "Username" }
                    input type="text" name="username" id="username" required;
                    label for="email" { "Email" }
                    input type="email" name="email" id="email" required;
                    label for="password" { "Password" }
                    input type="password" name="password" id="password" required;
                    button type="submit" { "Sign up" }
                }
                p {
                    "Already registered? "
                    a href="/login" { "Log in" }
                }
            }
        },
    )
}

/// Render the authenticated landing page.
#[must_use]
pub fn dashboard_page(user: &User) -> Markup {
    base(
        "Dashboard",
        Some(user),
        html! {
            h1 { "Hello, " (user.username) }
            p { "You are logged in." }
            ul {
                li { a href="/forum_post" { "Go to the forum" } }
                li { a href="/logout" { "Log out" } }
            }
        },
    )
}

/// Render the forum page: the post form plus every post, oldest first.
#[must_use]
pub fn posts_page(user: Option<&User>, posts: &[Post], error: Option<&str>) -> Markup {
    base(
        "Forum",
        user,
        html! {
            h1 { "Forum" }
            (error_banner(error))
            form method="post" action="/forum_post" {
                label for="post_content" { "New post" }
                textarea name="post_content" id="post_content" rows="4" required {}
                button type="submit" { "Post" }
            }
            @if posts.is_empty() {
                p { "No posts yet." }
            } @else {
                @for post in posts {
                    article {
                        p { (post.content) }
                        footer {
                            small { (post.created_at) " | " }
                            a href={ "/post/" (post.id) } { "View" }
                            " | "
                            a href={ "/reply/" (post.id) } { "Reply" }
                        }
                    }
                }
            }
        },
    )
}

/// Render a single post with its replies in creation order.
#[must_use]
pub fn post_page(user: Option<&User>, post: &Post, replies: &[Reply]) -> Markup {
    base(
        "Post",
        user,
        html! {
            article {
                p { (post.content) }
                footer { small { (post.created_at) } }
            }
            h2 { "Replies" }
            @if replies.is_empty() {
                p { "No replies yet." }
            } @else {
                @for reply in replies {
                    article {
                        p { (reply.content) }
                        footer { small { (reply.created_at) } }
                    }
                }
            }
            a href={ "/reply/" (post.id) } role="button" { "Reply" }
        },
    )
}

/// Render the reply form for a post.
#[must_use]
pub fn reply_page(user: Option<&User>, post: &Post, error: Option<&str>) -> Markup {
    base(
        "Reply",
        user,
        html! {
            article {
                p { (post.content) }
                footer { small { (post.created_at) } }
            }
            (error_banner(error))
            form method="post" action={ "/reply/" (post.id) } {
                label for="reply_content" { "Your reply" }
                textarea name="reply_content" id="reply_content" rows="4" required {}
                button type="submit" { "Reply" }
            }
        },
    )
}

/// Render the sorted exchange-rate table.
#[must_use]
pub fn rates_page(user: Option<&User>, rates: &BTreeMap<String, f64>) -> Markup {
    base(
        "Exchange Rates",
        user,
        html! {
            h1 { "Exchange Rates" }
            table {
                thead {
                    tr {
                        th { "Currency code" }
                        th { "Exchange rate" }
                    }
                }
                tbody {
                    @for (code, rate) in rates {
                        tr {
                            td { (code) }
                            td { (rate) }
                        }
                    }
                }
            }
        },
    )
}

/// Render the 404 page for a missing post.
#[must_use]
pub fn not_found_page(message: &str) -> Markup {
    base(
        "Not Found",
        None,
        html! {
            h1 { "404" }
            p { (message) }
            p { a href="/" { "Back to the home page" } }
        },
    )
}
