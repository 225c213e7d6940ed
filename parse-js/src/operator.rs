use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum OperatorName {
  Addition,
  Assignment,
  AssignmentAddition,
  AssignmentBitwiseAnd,
  AssignmentBitwiseLeftShift,
  AssignmentBitwiseOr,
  AssignmentBitwiseRightShift,
  AssignmentBitwiseUnsignedRightShift,
  AssignmentBitwiseXor,
  AssignmentDivision,
  AssignmentExponentiation,
  AssignmentLogicalAnd,
  AssignmentLogicalOr,
  AssignmentMultiplication,
  AssignmentNullishCoalescing,
  AssignmentRemainder,
  AssignmentSubtraction,
  Await,
  BitwiseAnd,
  BitwiseLeftShift,
  BitwiseNot,
  BitwiseOr,
  BitwiseRightShift,
  BitwiseUnsignedRightShift,
  BitwiseXor,
  Call,
  Comma,
  ComputedMemberAccess,
  Conditional,
  Delete,
  Division,
  Equality,
  Exponentiation,
  GreaterThan,
  GreaterThanOrEqual,
  In,
  Inequality,
  Instanceof,
  LessThan,
  LessThanOrEqual,
  LogicalAnd,
  LogicalNot,
  LogicalOr,
  MemberAccess,
  Multiplication,
  New,
  NullishCoalescing,
  OptionalChainingCall,
  OptionalChainingComputedMemberAccess,
  OptionalChainingMemberAccess,
  PostfixDecrement,
  PostfixIncrement,
  PrefixDecrement,
  PrefixIncrement,
  Remainder,
  StrictEquality,
  StrictInequality,
  Subtraction,
  Typeof,
  UnaryNegation,
  UnaryPlus,
  Void,
  Yield,
  YieldDelegated,
}

impl OperatorName {
  pub fn is_assignment(self) -> bool {
    matches!(
      self,
      OperatorName::Assignment
        | OperatorName::AssignmentAddition
        | OperatorName::AssignmentBitwiseAnd
        | OperatorName::AssignmentBitwiseLeftShift
        | OperatorName::AssignmentBitwiseOr
        | OperatorName::AssignmentBitwiseRightShift
        | OperatorName::AssignmentBitwiseUnsignedRightShift
        | OperatorName::AssignmentBitwiseXor
        | OperatorName::AssignmentDivision
        | OperatorName::AssignmentExponentiation
        | OperatorName::AssignmentLogicalAnd
        | OperatorName::AssignmentLogicalOr
        | OperatorName::AssignmentMultiplication
        | OperatorName::AssignmentNullishCoalescing
        | OperatorName::AssignmentRemainder
        | OperatorName::AssignmentSubtraction
    )
  }

  pub fn is_update(self) -> bool {
    matches!(
      self,
      OperatorName::PostfixDecrement
        | OperatorName::PostfixIncrement
        | OperatorName::PrefixDecrement
        | OperatorName::PrefixIncrement
    )
  }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Associativity {
  Left,
  Right,
}

#[derive(Debug)]
pub struct Operator {
  pub name: OperatorName,
  pub precedence: u8,
  pub associativity: Associativity,
}

const PRECEDENCE_LEVELS: &[(&[OperatorName], Associativity)] = &[
  (&[OperatorName::Comma], Associativity::Left),
  (
    &[
      OperatorName::Assignment,
      OperatorName::AssignmentAddition,
      OperatorName::AssignmentBitwiseAnd,
      OperatorName::AssignmentBitwiseLeftShift,
      OperatorName::AssignmentBitwiseOr,
      OperatorName::AssignmentBitwiseRightShift,
      OperatorName::AssignmentBitwiseUnsignedRightShift,
      OperatorName::AssignmentBitwiseXor,
      OperatorName::AssignmentDivision,
      OperatorName::AssignmentExponentiation,
      OperatorName::AssignmentLogicalAnd,
      OperatorName::AssignmentLogicalOr,
      OperatorName::AssignmentMultiplication,
      OperatorName::AssignmentNullishCoalescing,
      OperatorName::AssignmentRemainder,
      OperatorName::AssignmentSubtraction,
      OperatorName::Yield,
      OperatorName::YieldDelegated,
    ],
    Associativity::Right,
  ),
  (&[OperatorName::Conditional], Associativity::Right),
  (
    &[OperatorName::LogicalOr, OperatorName::NullishCoalescing],
    Associativity::Left,
  ),
  (&[OperatorName::LogicalAnd], Associativity::Left),
  (&[OperatorName::BitwiseOr], Associativity::Left),
  (&[OperatorName::BitwiseXor], Associativity::Left),
  (&[OperatorName::BitwiseAnd], Associativity::Left),
  (
    &[
      OperatorName::Equality,
      OperatorName::Inequality,
      OperatorName::StrictEquality,
      OperatorName::StrictInequality,
    ],
    Associativity::Left,
  ),
  (
    &[
      OperatorName::GreaterThan,
      OperatorName::GreaterThanOrEqual,
      OperatorName::In,
      OperatorName::Instanceof,
      OperatorName::LessThan,
      OperatorName::LessThanOrEqual,
    ],
    Associativity::Left,
  ),
  (
    &[
      OperatorName::BitwiseLeftShift,
      OperatorName::BitwiseRightShift,
      OperatorName::BitwiseUnsignedRightShift,
    ],
    Associativity::Left,
  ),
  (
    &[OperatorName::Addition, OperatorName::Subtraction],
    Associativity::Left,
  ),
  (
    &[
      OperatorName::Division,
      OperatorName::Multiplication,
      OperatorName::Remainder,
    ],
    Associativity::Left,
  ),
  (&[OperatorName::Exponentiation], Associativity::Right),
  (
    &[
      OperatorName::Await,
      OperatorName::BitwiseNot,
      OperatorName::Delete,
      OperatorName::LogicalNot,
      OperatorName::PrefixDecrement,
      OperatorName::PrefixIncrement,
      OperatorName::Typeof,
      OperatorName::UnaryNegation,
      OperatorName::UnaryPlus,
      OperatorName::Void,
    ],
    Associativity::Right,
  ),
  (
    &[OperatorName::PostfixDecrement, OperatorName::PostfixIncrement],
    Associativity::Left,
  ),
  (&[OperatorName::New], Associativity::Right),
  (
    &[
      OperatorName::Call,
      OperatorName::ComputedMemberAccess,
      OperatorName::MemberAccess,
      OperatorName::OptionalChainingCall,
      OperatorName::OptionalChainingComputedMemberAccess,
      OperatorName::OptionalChainingMemberAccess,
    ],
    Associativity::Left,
  ),
];

// Precedence starts at 1 so that 0 can be used as "accept any operator" by the expression parser.
pub static OPERATORS: Lazy<HashMap<OperatorName, Operator>> = Lazy::new(|| {
  let mut map = HashMap::<OperatorName, Operator>::new();
  for (i, (names, associativity)) in PRECEDENCE_LEVELS.iter().enumerate() {
    for &name in names.iter() {
      map.insert(name, Operator {
        name,
        precedence: (i + 1) as u8,
        associativity: *associativity,
      });
    }
  }
  map
});
