//! Built-in sample case for trying the judge by hand.

use serde::Serialize;

use crate::types::{Side, ARGUMENT_BUDGET};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SampleInfo {
    pub name: &'static str,
    pub filename: &'static str,
    pub title: &'static str,
}

pub const SAMPLES: &[SampleInfo] = &[
    SampleInfo {
        name: "plaintiff",
        filename: "plaintiff_case.txt",
        title: "Side A: tenant's complaint",
    },
    SampleInfo {
        name: "defendant",
        filename: "defendant_case.txt",
        title: "Side B: landlord's reply",
    },
    SampleInfo {
        name: "arguments",
        filename: "arguments_5_rounds.txt",
        title: "Five rounds of arguments for both sides",
    },
];

pub const PLAINTIFF_CASE: &str = "\
TENANT'S COMPLAINT - SIDE A
===========================

Case: Mehta vs. Greenfield Residency Pvt. Ltd.
Plaintiff: Ms. Ananya Mehta (tenant)
Defendant: Greenfield Residency Pvt. Ltd. (landlord)

FACTS:
1. The plaintiff leased flat 4B from the defendant from 1 June 2022 to 31 May 2024.
2. A security deposit of Rs. 1,20,000 was paid at signing.
3. The flat was vacated on 31 May 2024 and keys were returned the same day.
4. A joint walkthrough on that day recorded only normal wear and tear.
5. Ninety days later the deposit has not been returned, and no itemised deductions
   have been provided.

RELIEF SOUGHT:
- Refund of the full deposit with interest at 9% per annum
- Rs. 25,000 for harassment and the cost of alternative arrangements
- Costs of these proceedings

LEGAL BASIS:
The lease, clause 11 (refund within 30 days of handover), and the Model Tenancy Act
provisions on refund of security deposits.
";

pub const DEFENDANT_CASE: &str = "\
LANDLORD'S REPLY - SIDE B
=========================

Case: Mehta vs. Greenfield Residency Pvt. Ltd.
Defendant: Greenfield Residency Pvt. Ltd. (landlord)
Plaintiff: Ms. Ananya Mehta (tenant)

FACTS:
1. The walkthrough on 31 May 2024 was a preliminary visual check, not a final inspection.
2. A detailed inspection on 3 June 2024 found water damage under the kitchen sink and a
   cracked bathroom basin.
3. Repair quotations total Rs. 68,000.
4. The final month's electricity and maintenance dues of Rs. 14,500 remain unpaid.
5. The plaintiff was informed by e-mail on 10 June 2024 and did not respond.

DEFENCE:
- Deductions for damage beyond normal wear and unpaid dues are permitted by clause 11.
- The balance of Rs. 37,500 has been offered and remains available.
- No harassment occurred; delay arose from the plaintiff's silence.

LEGAL BASIS:
The lease, clauses 9 (tenant's duty of care) and 11 (deductions from deposit).
";

/// One argument per round for each side, in round order.
pub const SAMPLE_ARGUMENTS: [[&str; 2]; ARGUMENT_BUDGET as usize] = [
    [
        "The handover walkthrough was signed by the defendant's own manager and records \
         no damage. A landlord cannot inspect again days later, after new workers have \
         accessed the flat, and attribute whatever it finds to the outgoing tenant.",
        "The walkthrough form is headed 'preliminary' and states that a final inspection \
         will follow within seven days. The plaintiff signed that form and accepted its terms.",
    ],
    [
        "Clause 11 requires itemised deductions within 30 days. The e-mail of 10 June gives \
         a lump sum with no invoices. The defendant missed its own deadline and cannot \
         withhold anything now.",
        "The 10 June e-mail attached both repair quotations. Delivery receipts show it \
         was opened. Itemisation was given in time.",
    ],
    [
        "The water damage comes from a pipe inside the wall, which is the landlord's \
         responsibility under clause 9(b). A tenant cannot be charged for structural plumbing.",
        "The plumber's report traces the leak to a loosened sink trap, a fixture inside the \
         unit, not to the wall pipe. Fixtures are the tenant's responsibility under clause 9(a).",
    ],
    [
        "Even if some deduction were allowed, the unpaid electricity bill was cleared on \
         2 June. The receipt is attached. The Rs. 14,500 deduction is therefore wrong.",
        "The receipt covers electricity only. Maintenance dues of Rs. 6,200 for May remain \
         unpaid, and the society's ledger confirms this.",
    ],
    [
        "Taken together, the defendant's shifting reasons and late paperwork show a pattern \
         of keeping deposits. The full refund with interest should follow.",
        "The defendant has documented every deduction and offered the balance. Any award \
         should be limited to the undisputed balance, with no compensation.",
    ],
];

pub fn sample_argument(side: Side, round: u8) -> Option<&'static str> {
    let idx = usize::from(round).checked_sub(1)?;
    SAMPLE_ARGUMENTS.get(idx).map(|pair| pair[side.index()])
}

fn render_arguments() -> String {
    let mut s = String::from("FIVE ROUNDS OF ARGUMENTS - BOTH SIDES\n=====================================\n");
    for (i, pair) in SAMPLE_ARGUMENTS.iter().enumerate() {
        let round = i + 1;
        s.push_str(&format!("\nROUND {round}\n--------\n"));
        for side in Side::ALL {
            s.push_str(&format!("\nSIDE {side}:\n\"{}\"\n", pair[side.index()]));
        }
    }
    s
}

/// Full text of a sample by its `name`.
pub fn sample_text(name: &str) -> Option<String> {
    match name {
        "plaintiff" => Some(PLAINTIFF_CASE.to_string()),
        "defendant" => Some(DEFENDANT_CASE.to_string()),
        "arguments" => Some(render_arguments()),
        _ => None,
    }
}

pub fn find(name: &str) -> Option<&'static SampleInfo> {
    SAMPLES.iter().find(|s| s.name == name)
}
