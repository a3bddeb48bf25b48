//! Shared chat room: one instance serves every caller.

use std::collections::{BTreeMap, HashMap};

use switchboard::{Arguments, Exposed, MethodTable, ParamType, TargetError, Value};
use tracing::debug;

use super::SERVICES_TARGET;

/// Chat room keeping logged-in users, their posts, and a room-wide feed.
///
/// Posts are stored newest first. Logging out parks a user's posts so they
/// are restored on the next login under the same name.
#[derive(Debug, Default)]
pub struct ChatService {
    users: BTreeMap<String, Vec<String>>,
    feed: Vec<String>,
    parked: HashMap<String, Vec<String>>,
}

impl ChatService {
    /// Returns `true` when `username` is logged in.
    #[must_use]
    pub fn is_logged_in(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    fn login(&mut self, username: &str) -> bool {
        if self.is_logged_in(username) {
            return false;
        }
        let posts = self.parked.remove(username).unwrap_or_default();
        self.users.insert(username.to_owned(), posts);
        debug!(target: SERVICES_TARGET, username, "chat user logged in");
        true
    }

    fn logout(&mut self, username: &str) -> bool {
        let Some(posts) = self.users.remove(username) else {
            return false;
        };
        self.parked.insert(username.to_owned(), posts);
        debug!(target: SERVICES_TARGET, username, "chat user logged out");
        true
    }

    fn post(&mut self, username: &str, message: &str) -> bool {
        let Some(posts) = self.users.get_mut(username) else {
            return false;
        };
        posts.insert(0, message.to_owned());
        self.feed.insert(0, format!("{username} says: {message}"));
        true
    }
}

/// Returns page `page` (zero-based) of `rows` items, empty past the end.
fn page_of<'a, I>(items: I, arguments: Arguments<'_>, first: usize) -> Result<Value, TargetError>
where
    I: IntoIterator<Item = &'a String>,
{
    let page = non_negative(arguments.int(first)?, "page")?;
    let rows = non_negative(arguments.int(first + 1)?, "rows")?;
    let start = page.checked_mul(rows).ok_or_else(|| {
        TargetError::illegal_argument(format!("page {page} of {rows} rows is out of range"))
    })?;
    Ok(Value::List(
        items
            .into_iter()
            .skip(start)
            .take(rows)
            .map(|item| Value::from(item.as_str()))
            .collect(),
    ))
}

fn non_negative(value: i32, name: &str) -> Result<usize, TargetError> {
    usize::try_from(value)
        .map_err(|_| TargetError::illegal_argument(format!("{name} must not be negative")))
}

impl Exposed for ChatService {
    fn methods() -> MethodTable<Self> {
        MethodTable::<Self>::builder()
            .method("validUsername", &[ParamType::String], ParamType::Boolean, |chat, arguments| {
                Ok(Value::from(chat.is_logged_in(arguments.string(0)?)))
            })
            .method("login", &[ParamType::String], ParamType::Boolean, |chat, arguments| {
                Ok(Value::from(chat.login(arguments.string(0)?)))
            })
            .method("logout", &[ParamType::String], ParamType::Boolean, |chat, arguments| {
                Ok(Value::from(chat.logout(arguments.string(0)?)))
            })
            .method(
                "post",
                &[ParamType::String, ParamType::String],
                ParamType::Boolean,
                |chat, arguments| {
                    Ok(Value::from(
                        chat.post(arguments.string(0)?, arguments.string(1)?),
                    ))
                },
            )
            .method(
                "getPosts",
                &[ParamType::Int, ParamType::Int],
                ParamType::List,
                |chat, arguments| page_of(&chat.feed, arguments, 0),
            )
            .method(
                "getPosts",
                &[ParamType::String, ParamType::Int, ParamType::Int],
                ParamType::List,
                |chat, arguments| {
                    let username = arguments.string(0)?;
                    let posts = chat.users.get(username).ok_or_else(|| {
                        TargetError::exception(
                            "InvalidUsername",
                            format!("Invalid Username: {username}"),
                        )
                    })?;
                    page_of(posts, arguments, 1)
                },
            )
            .method(
                "getUsers",
                &[ParamType::Int, ParamType::Int],
                ParamType::List,
                |chat, arguments| page_of(chat.users.keys(), arguments, 0),
            )
            .describe_as("_describe")
            .build()
    }
}
