use serde::{Deserialize, Serialize};

/// Display locale for scope descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

/// Icon category a scope row is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeIcon {
    /// Identity verification.
    Identity,
    /// Profile data.
    User,
    /// Email address.
    Mail,
    /// Account balance.
    Money,
    /// Usage statistics.
    Histogram,
    /// API tokens.
    Key,
    /// Unrecognized scope.
    Generic,
}

/// Localized display data for one scope identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDescriptor {
    /// The raw scope identifier, e.g. `balance:read`.
    pub id: String,
    /// Short display name.
    pub name: String,
    /// One-line description of what the grant allows.
    pub description: String,
    /// Icon category.
    pub icon: ScopeIcon,
}

/// Look up the display descriptor for a scope identifier.
///
/// Identifiers outside the catalog are never dropped: they fall back to the
/// raw identifier for both name and description, so the user is never asked
/// to approve a permission that is not listed.
pub fn describe_scope(id: &str, locale: Locale) -> ScopeDescriptor {
    let en = matches!(locale, Locale::En);
    let (name, description, icon) = match id {
        "openid" => if en {
            ("Identity", "Verify your identity", ScopeIcon::Identity)
        } else {
            ("身份验证", "验证您的身份", ScopeIcon::Identity)
        },
        "profile" => if en {
            ("Profile", "Access your username and avatar", ScopeIcon::User)
        } else {
            ("基本信息", "访问您的用户名和头像", ScopeIcon::User)
        },
        "email" => if en {
            ("Email", "Access your email address", ScopeIcon::Mail)
        } else {
            ("邮箱地址", "访问您的邮箱地址", ScopeIcon::Mail)
        },
        "balance:read" => if en {
            ("Balance", "View your account balance", ScopeIcon::Money)
        } else {
            ("余额查看", "查看您的账户余额", ScopeIcon::Money)
        },
        "usage:read" => if en {
            ("Usage", "View your API usage records", ScopeIcon::Histogram)
        } else {
            ("使用记录", "查看您的 API 使用记录", ScopeIcon::Histogram)
        },
        "tokens:read" => if en {
            ("Tokens (Read)", "View your API token list", ScopeIcon::Key)
        } else {
            ("令牌查看", "查看您的 API 令牌列表", ScopeIcon::Key)
        },
        "tokens:write" => if en {
            ("Tokens (Write)", "Create and delete API tokens", ScopeIcon::Key)
        } else {
            ("令牌管理", "创建和删除 API 令牌", ScopeIcon::Key)
        },
        other => {
            return ScopeDescriptor {
                id: other.to_string(),
                name: other.to_string(),
                description: other.to_string(),
                icon: ScopeIcon::Generic,
            }
        }
    };
    ScopeDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon,
    }
}
