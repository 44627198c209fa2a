use crate::ast::{Expr, Program, Stmt};

/// Prints a parenthesized tree form of a parsed program, for the `--ast`
/// flag. The AST here is a flat tagged enum rather than a trait-object
/// tree, so this is a plain recursive match rather than a visitor dispatch.
pub fn print_program(program: &Program) -> String {
    program.iter().map(print_stmt).collect::<Vec<_>>().join("\n")
}

fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Assignment { target, operator, value, explicit, .. } => {
            let rhs = value.as_ref().map(print_expr).unwrap_or_default();
            if *explicit {
                format!("({} {} {})", operator.lexeme, target.lexeme, rhs)
            } else if rhs.is_empty() {
                format!("({} {})", operator.lexeme, target.lexeme)
            } else {
                format!("({} {} {})", operator.lexeme, target.lexeme, rhs)
            }
        }
        Stmt::Conditional { token, condition, then_block, else_block } => {
            let mut out = format!("({} {} {}", token.lexeme, print_expr(condition), print_block(then_block));
            if let Some(else_block) = else_block {
                out += &format!(" else {}", print_block(else_block));
            }
            out += ")";
            out
        }
        Stmt::For { init, condition, post, body, .. } => {
            format!("(for {} {} {} {})", print_stmt(init), print_expr(condition), print_stmt(post), print_block(body))
        }
        Stmt::Def { name, params, body, .. } => {
            let params = params.iter().map(|p| p.name.lexeme.clone()).collect::<Vec<_>>().join(" ");
            format!("(def {}({}) {})", name.lexeme, params, print_block(body))
        }
        Stmt::Return { branch, .. } => match branch {
            Some(_) => "(return <branch>)".to_string(),
            None => "(return)".to_string(),
        },
        Stmt::VoidCall { name, args, .. } => {
            let args = args.iter().map(print_expr).collect::<Vec<_>>().join(" ");
            format!("({}({}))", name.lexeme, args)
        }
        Stmt::Break { .. } => "(break)".to_string(),
        Stmt::Continue { .. } => "(continue)".to_string(),
        Stmt::OpenScope => "{".to_string(),
        Stmt::CloseScope => "}".to_string(),
    }
}

fn print_block(block: &[Stmt]) -> String {
    format!("{{ {} }}", block.iter().map(print_stmt).collect::<Vec<_>>().join(" "))
}

fn print_expr(expr: &Expr) -> String {
    if expr.is_call {
        let args = expr.args.iter().map(print_expr).collect::<Vec<_>>().join(" ");
        return format!("({}({}))", expr.token.lexeme, args);
    }

    match (&expr.left, &expr.right) {
        (Some(left), Some(right)) => format!("({} {} {})", expr.token.lexeme, print_expr(left), print_expr(right)),
        (Some(operand), None) => format!("({} {})", expr.token.lexeme, print_expr(operand)),
        (None, _) => expr.token.lexeme.clone(),
    }
}
