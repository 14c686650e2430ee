//! Abstract Syntax Tree definitions

mod expr;
mod span;
mod types;

pub use expr::*;
pub use span::*;
pub use types::*;

use serde::Serialize;

/// A program is a sequence of statements executed top to bottom
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub stmts: Vec<Spanned<Stmt>>,
}

/// Statement. Each one is wrapped in a [`Spanned`] so runtime errors can point
/// at the statement that raised them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// `{ ... }`; does not open a scope
    Block(Vec<Spanned<Stmt>>),

    /// `[trace] type name [= init];`
    Declare {
        traced: bool,
        ty: TypeName,
        name: String,
        init: Option<Expr>,
    },

    /// `name = value;`
    Assign { name: String, value: Expr },

    /// `name[index] = value;`
    ArrayAssign {
        name: String,
        index: Expr,
        value: Expr,
    },

    /// `name op= value;`
    CompoundAssign {
        name: String,
        op: CompoundOp,
        value: Expr,
    },

    /// `name++;` / `name--;`
    IncDec { name: String, op: IncDecOp },

    If {
        cond: Expr,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },

    While {
        cond: Expr,
        body: Box<Spanned<Stmt>>,
    },

    /// C-style loop; runs in its own child scope
    For {
        init: Option<Box<Spanned<Stmt>>>,
        cond: Expr,
        update: Option<Box<Spanned<Stmt>>>,
        body: Box<Spanned<Stmt>>,
    },

    FunctionDecl(FnDef),

    Return(Option<Expr>),

    Print(Expr),

    /// Bare expression evaluated for its side effects
    Expr(Expr),
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FnDef {
    pub name: String,
    pub ret_ty: TypeName,
    pub params: Vec<Param>,
    pub body: Vec<Spanned<Stmt>>,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub ty: TypeName,
    pub name: String,
}
