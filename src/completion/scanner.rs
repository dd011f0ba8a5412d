/// Characters that end an expression when met outside brackets
const DELIMITERS: &str = " \t\n`~!@#$%^&*-=+\\|;:,<>[](){}/?";

const CLOSERS: &str = ")]}";
const OPENERS: &str = "([{";

/// Split `text` into everything before its last expression and the last
/// expression itself.
///
/// Walks backwards counting brackets: closers deepen the nesting, openers
/// only matter while nested. The first delimiter met at nesting zero ends
/// the expression. When that delimiter is the very last character the whole
/// text is returned as the expression, which is how a trailing `[` or `(`
/// stays attached to what it opens.
///
/// ```rust
/// use probeline::completion::last_expr;
///
/// assert_eq!(last_expr("x = foo.bar"), ("x = ", "foo.bar"));
/// assert_eq!(last_expr("f(a[1], b).c"), ("", "f(a[1], b).c"));
/// assert_eq!(last_expr("x = a["), ("", "x = a["));
/// ```
pub fn last_expr(text: &str) -> (&str, &str) {
    let mut nesting = 0usize;
    for (idx, c) in text.char_indices().rev() {
        if CLOSERS.contains(c) {
            nesting += 1;
        } else if nesting > 0 {
            if OPENERS.contains(c) {
                nesting -= 1;
            }
        } else if DELIMITERS.contains(c) {
            let end = idx + c.len_utf8();
            if end == text.len() {
                return ("", text);
            }
            return text.split_at(end);
        }
    }
    ("", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("", ("", ""))]
    #[case("abc", ("", "abc"))]
    #[case("print(sys.ver", ("print(", "sys.ver"))]
    #[case("a = b + c.d", ("a = b + ", "c.d"))]
    #[case("x = d['k'].ke", ("x = ", "d['k'].ke"))]
    #[case("foo(1, [2, 3]).ba", ("", "foo(1, [2, 3]).ba"))]
    #[case("x, y = g(h(i)).j", ("x, y = ", "g(h(i)).j"))]
    #[case("a[", ("", "a["))]
    #[case("print(", ("", "print("))]
    #[case("a ", ("", "a "))]
    fn splits_at_last_delimiter(#[case] text: &str, #[case] expected: (&str, &str)) {
        assert_eq!(last_expr(text), expected);
    }

    #[test]
    fn unbalanced_closers_swallow_everything() {
        assert_eq!(last_expr("a b)"), ("", "a b)"));
    }

    fn depth(text: &str) -> i64 {
        text.chars().fold(0, |depth, c| {
            if OPENERS.contains(c) {
                depth + 1
            } else if CLOSERS.contains(c) {
                depth - 1
            } else {
                depth
            }
        })
    }

    fn balanced_expr() -> impl Strategy<Value = String> {
        (
            "[a-z_][a-z0-9_]{0,5}",
            proptest::option::of("[a-z0-9, ]{0,6}"),
            proptest::option::of("[a-z]{1,4}"),
        )
            .prop_map(|(head, args, member)| {
                let mut expr = head;
                if let Some(args) = args {
                    expr.push('(');
                    expr.push_str(&args);
                    expr.push(')');
                }
                if let Some(member) = member {
                    expr.push('.');
                    expr.push_str(&member);
                }
                expr
            })
    }

    proptest! {
        #[test]
        fn trailing_balanced_expression_is_found_whole(
            prefix in "[a-z =,+]{0,12}",
            expr in balanced_expr(),
        ) {
            let text = format!("{prefix} {expr}");
            let (pretext, found) = last_expr(&text);
            prop_assert_eq!(found, expr.as_str());
            prop_assert_eq!(depth(found), 0);
            prop_assert_eq!(format!("{pretext}{found}"), text);
        }
    }
}
