use crate::token::Token;

/// The static type of an expression or binding.
///
/// `Invalid` is not a real type a value can carry at runtime; it is a
/// poison marker the analyzer attaches when an earlier diagnostic already
/// explained what went wrong, so that the same root cause doesn't cascade
/// into a wall of follow-on type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Invalid,
    Bool,
    Int,
    Void,
    Func,
}

impl DataType {
    /// An operand of this type never triggers a binary-operator type error,
    /// regardless of what it's paired with.
    pub fn suppresses(self) -> bool {
        self == DataType::Invalid
    }
}

/// How a name resolved by the analyzer should be looked up at runtime.
///
/// Replaces the `-1`/bounded-index sentinel from the reference design with
/// an explicit enum. `FromTop` is assigned when a name resolves through the
/// enclosing function's own parameters or locals: those frames are always
/// pushed fresh on top of whatever existed at call time, so searching
/// unbounded from the top always finds them before ever reaching a caller's
/// locals. `At(depth)` is assigned when a name resolves through the outer
/// (file-level) cache, which lives at a fixed, statically known frame depth
/// no matter how deep the call stack gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRef {
    FromTop,
    At(usize),
}

/// A node in an expression tree.
#[derive(Debug, Clone)]
pub struct Expr {
    pub token: Token,
    pub data_type: DataType,
    pub left: Option<Box<Expr>>,
    pub right: Option<Box<Expr>>,
    /// Populated only for call expressions; distinguishes a zero-argument
    /// call from a bare variable reference, which otherwise agree on every
    /// other field (both have `left`/`right` `None` and `scope: Some(..)`).
    pub is_call: bool,
    pub args: Vec<Expr>,
    /// Populated only for identifier and call expressions.
    pub scope: Option<ScopeRef>,
}

impl Expr {
    pub fn leaf(token: Token, data_type: DataType) -> Expr {
        Expr { token, data_type, left: None, right: None, is_call: false, args: Vec::new(), scope: None }
    }

    pub fn unary(token: Token, data_type: DataType, operand: Expr) -> Expr {
        Expr { token, data_type, left: Some(Box::new(operand)), right: None, is_call: false, args: Vec::new(), scope: None }
    }

    pub fn binary(token: Token, data_type: DataType, left: Expr, right: Expr) -> Expr {
        Expr {
            token,
            data_type,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            is_call: false,
            args: Vec::new(),
            scope: None,
        }
    }

    pub fn variable(token: Token, data_type: DataType, scope: ScopeRef) -> Expr {
        Expr { token, data_type, left: None, right: None, is_call: false, args: Vec::new(), scope: Some(scope) }
    }

    pub fn call(token: Token, data_type: DataType, args: Vec<Expr>, scope: ScopeRef) -> Expr {
        Expr { token, data_type, left: None, right: None, is_call: true, args, scope: Some(scope) }
    }
}

/// A function parameter's declared name and type.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Token,
    pub data_type: DataType,
}

/// A block of statements bracketed by an implicit or explicit scope.
pub type Block = Vec<Stmt>;

/// A single statement in the program.
#[derive(Debug, Clone)]
pub enum Stmt {
    Assignment {
        target: Token,
        operator: Token,
        value: Option<Expr>,
        data_type: DataType,
        explicit: bool,
        scope: ScopeRef,
    },
    Conditional {
        token: Token,
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    For {
        token: Token,
        init: Box<Stmt>,
        condition: Expr,
        post: Box<Stmt>,
        body: Block,
    },
    Def {
        token: Token,
        name: Token,
        params: Vec<Param>,
        return_type: DataType,
        body: Block,
        return_branches: Vec<Expr>,
    },
    Return {
        token: Token,
        branch: Option<usize>,
    },
    VoidCall {
        token: Token,
        name: Token,
        args: Vec<Expr>,
        scope: ScopeRef,
    },
    Break {
        token: Token,
    },
    Continue {
        token: Token,
    },
    OpenScope,
    CloseScope,
}

/// A parsed program: an ordered sequence of top-level statements.
pub type Program = Vec<Stmt>;
