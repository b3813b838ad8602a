//! Diagnostic message rendering.

use crate::call_site::CallSite;
use crate::matcher::is_disallowed;
use crate::rule::DisallowedCall;
use crate::utils::paths::PathMatcher;

/// Finds the first rule (in configured order) that forbids calling `name`
/// at `site` and renders its message.
///
/// `display_name` is the identifier the call was written as, when it
/// differs from where the callee is declared (a subclass or a class using a
/// trait).
///
/// Returns `None` when no rule applies.
#[must_use]
pub fn disallowed_message(
    site: &CallSite,
    name: &str,
    display_name: Option<&str>,
    rules: &[DisallowedCall],
    paths: &dyn PathMatcher,
) -> Option<String> {
    rules
        .iter()
        .find(|rule| is_disallowed(site, name, rule, paths))
        .map(|rule| render(rule, name, display_name))
}

/// Renders the message for a matched rule.
///
/// ```text
/// Calling Base::woofer() (as Sub::woofer()) is forbidden, <message>
/// Calling Foo::barBaz() is forbidden, <message> [Foo::barBaz() matches Foo::bar*()]
/// ```
#[must_use]
pub fn render(rule: &DisallowedCall, name: &str, display_name: Option<&str>) -> String {
    let shown = match display_name {
        Some(display) if !display.is_empty() && display != name => {
            format!("{name}() (as {display}())")
        }
        _ => format!("{name}()"),
    };
    let suffix = if rule.call() == name {
        String::new()
    } else {
        format!(" [{name}() matches {}()]", rule.call())
    };
    format!(
        "Calling {shown} is forbidden, {}{suffix}",
        rule.message().unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_site::Argument;
    use crate::rule::{AllowPath, CallPattern};
    use crate::types::Location;
    use crate::utils::paths::GlobPathMatcher;

    fn rule(call: &str, message: &str) -> DisallowedCall {
        DisallowedCall::new(CallPattern::new(call).unwrap(), Some(message.to_string()))
    }

    fn site(file: &str) -> CallSite {
        CallSite::new(Location::new(file, 7, 1))
    }

    fn paths() -> GlobPathMatcher {
        GlobPathMatcher::new("/project")
    }

    #[test]
    fn exact_match_message() {
        let rules = [rule("Fiction\\Pulp\\Royale::withCheese()", "a Quarter Pounder with Cheese?")];
        let msg = disallowed_message(
            &site("/project/src/a.php"),
            "Fiction\\Pulp\\Royale::withCheese",
            None,
            &rules,
            &paths(),
        )
        .unwrap();
        insta::assert_snapshot!(msg, @r"Calling Fiction\Pulp\Royale::withCheese() is forbidden, a Quarter Pounder with Cheese?");
    }

    #[test]
    fn wildcard_match_adds_suffix() {
        let rules = [rule("\\Fiction\\Pulp\\Royale::withBad*()", "a Quarter Pounder with Cheese?")];
        let msg = disallowed_message(
            &site("/project/src/a.php"),
            "Fiction\\Pulp\\Royale::withBadCheese",
            None,
            &rules,
            &paths(),
        )
        .unwrap();
        insta::assert_snapshot!(msg, @r"Calling Fiction\Pulp\Royale::withBadCheese() is forbidden, a Quarter Pounder with Cheese? [Fiction\Pulp\Royale::withBadCheese() matches Fiction\Pulp\Royale::withBad*()]");
    }

    #[test]
    fn display_alias_is_shown_when_different() {
        let rules = [rule("Inheritance\\Base::woofer()", "method Base::woofer() is dangerous")];
        let msg = disallowed_message(
            &site("/project/src/a.php"),
            "Inheritance\\Base::woofer",
            Some("Inheritance\\Sub::woofer"),
            &rules,
            &paths(),
        )
        .unwrap();
        insta::assert_snapshot!(msg, @r"Calling Inheritance\Base::woofer() (as Inheritance\Sub::woofer()) is forbidden, method Base::woofer() is dangerous");
    }

    #[test]
    fn display_alias_equal_to_name_is_hidden() {
        let r = rule("Foo::bar", "no");
        assert_eq!(
            render(&r, "Foo::bar", Some("Foo::bar")),
            "Calling Foo::bar() is forbidden, no"
        );
        assert_eq!(render(&r, "Foo::bar", Some("")), "Calling Foo::bar() is forbidden, no");
    }

    #[test]
    fn missing_message_renders_empty() {
        let r = DisallowedCall::new(CallPattern::new("eval").unwrap(), None);
        assert_eq!(render(&r, "eval", None), "Calling eval() is forbidden, ");
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = [
            rule("Foo::*", "first"),
            rule("Foo::bar", "second"),
        ];
        let msg = disallowed_message(&site("/project/a.php"), "Foo::bar", None, &rules, &paths())
            .unwrap();
        assert!(msg.contains("first"));

        let reversed = [rule("Foo::bar", "second"), rule("Foo::*", "first")];
        let msg =
            disallowed_message(&site("/project/a.php"), "Foo::bar", None, &reversed, &paths())
                .unwrap();
        assert_eq!(msg, "Calling Foo::bar() is forbidden, second");
    }

    #[test]
    fn allowed_rule_is_skipped_for_later_rule() {
        let rules = [
            rule("Foo::bar", "allowed here")
                .with_allow_in(vec![AllowPath::new("src/*").unwrap()]),
            rule("Foo::*", "fallback"),
        ];
        let msg = disallowed_message(&site("/project/src/a.php"), "Foo::bar", None, &rules, &paths())
            .unwrap();
        assert!(msg.contains("fallback"));
    }

    #[test]
    fn no_match_produces_nothing() {
        let rules = [rule("Foo::bar", "no")];
        let s = site("/project/a.php").with_args([Argument::literal(1)]);
        assert!(disallowed_message(&s, "Foo::baz", None, &rules, &paths()).is_none());
        assert!(disallowed_message(&s, "Foo::bar", None, &[], &paths()).is_none());
    }
}
