use colored::Colorize;

/// Lines of source shown above the invocation.
const CONTEXT_LINES: usize = 3;

/// Where the failing client call was made. `source` is the content of `file`, when the caller
/// could read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsite {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PrintStackArgs<'a> {
    pub callsite: Option<&'a Callsite>,
    pub original_method: &'a str,
    pub show_colors: bool,
    pub is_validation_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintStackResult {
    /// The header, ending where the echoed arguments should start.
    pub stack: String,
    /// Column the echoed arguments continue at.
    pub indent: usize,
    /// Text closing the invocation after the echo.
    pub after_lines: String,
}

pub fn print_stack(args: PrintStackArgs<'_>) -> PrintStackResult {
    let paint = |s: String, style: fn(&str) -> colored::ColoredString| {
        if args.show_colors { style(&s).to_string() } else { s }
    };

    let function_name = paint(format!("prisma.{}()", args.original_method), |s| s.bold());
    let no_context = |intro: String| PrintStackResult {
        stack: intro,
        indent: 0,
        after_lines: String::new(),
    };

    let Some(callsite) = args.callsite else {
        return no_context(format!("\nInvalid `{function_name}` invocation:\n\n"));
    };

    let location = paint(
        format!("{}:{}:{}", callsite.file, callsite.line, callsite.column),
        |s| s.underline(),
    );
    let intro = format!("\nInvalid `{function_name}` invocation in\n{location}\n\n");

    let Some(source) = callsite.source.as_deref() else {
        return no_context(intro);
    };

    let first_line = callsite.line.saturating_sub(CONTEXT_LINES).max(1);
    let lines: Vec<&str> = source
        .lines()
        .skip(first_line - 1)
        .take(callsite.line + 1 - first_line)
        .collect();

    match lines.last() {
        Some(line) if !line.trim().is_empty() && lines.len() == callsite.line + 1 - first_line => (),
        _ => return no_context(intro),
    }

    let lines = dedent(&lines);
    let number_width = callsite.line.to_string().len();
    let (call_line, previous) = match lines.split_last() {
        Some(split) => split,
        None => return no_context(intro),
    };

    let mut stack = intro;

    for (offset, line) in previous.iter().enumerate() {
        let numbered = format!("  {:>number_width$} {line}", first_line + offset);
        stack.push_str(&paint(numbered.trim_end().to_owned(), |s| s.dimmed()));
        stack.push('\n');
    }

    let method_name = args.original_method.rsplit('.').next().unwrap_or(args.original_method);

    let (call_text, after_lines) = if args.is_validation_error {
        (cut_after_call(call_line, method_name), paint(")".to_owned(), |s| s.dimmed()))
    } else {
        (call_line.clone(), String::new())
    };

    let prefix = format!("{} {:>number_width$} ", paint("→".to_owned(), |s| s.red()), callsite.line);
    let leading_whitespace = call_line.len() - call_line.trim_start().len();

    stack.push_str(&prefix);
    stack.push_str(&call_text);

    PrintStackResult {
        stack,
        indent: number_width + 3 + leading_whitespace,
        after_lines,
    }
}

/// The invocation line up to and including the opening parenthesis of the call.
fn cut_after_call(line: &str, method_name: &str) -> String {
    let call = format!("{method_name}(");

    let end = line
        .find(&call)
        .map(|idx| idx + call.len())
        .or_else(|| line.find('(').map(|idx| idx + 1));

    match end {
        Some(end) => line[..end].to_owned(),
        None => format!("{line}("),
    }
}

fn dedent(lines: &[&str]) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(common..).unwrap_or_default().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn args<'a>(callsite: Option<&'a Callsite>) -> PrintStackArgs<'a> {
        PrintStackArgs {
            callsite,
            original_method: "user.findMany",
            show_colors: false,
            is_validation_error: true,
        }
    }

    #[test]
    fn without_callsite_only_the_method_is_named() {
        let result = print_stack(args(None));

        assert_eq!(result.stack, "\nInvalid `prisma.user.findMany()` invocation:\n\n");
        assert_eq!(result.indent, 0);
        assert_eq!(result.after_lines, "");
    }

    #[test]
    fn callsite_without_source_names_the_location() {
        let callsite = Callsite {
            file: "/app/index.ts".to_owned(),
            line: 12,
            column: 3,
            source: None,
        };

        let result = print_stack(args(Some(&callsite)));
        assert_eq!(result.stack, "\nInvalid `prisma.user.findMany()` invocation in\n/app/index.ts:12:3\n\n");
    }

    #[test]
    fn source_context_leads_into_the_call() {
        let source = indoc! {"
            import { PrismaClient } from '@prisma/client'
            const prisma = new PrismaClient()

            async function main() {
              const users = await prisma.user.findMany({ where: {} })
            }
        "};

        let callsite = Callsite {
            file: "/app/index.ts".to_owned(),
            line: 5,
            column: 35,
            source: Some(source.to_owned()),
        };

        let result = print_stack(args(Some(&callsite)));

        assert_eq!(
            result.stack,
            indoc! {"

                Invalid `prisma.user.findMany()` invocation in
                /app/index.ts:5:35

                  2 const prisma = new PrismaClient()
                  3
                  4 async function main() {
                → 5   const users = await prisma.user.findMany("}
        );
        assert_eq!(result.indent, 6);
        assert_eq!(result.after_lines, ")");
    }
}
