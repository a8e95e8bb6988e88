use arbitrary::{Arbitrary, Unstructured};
use avlplus::{proof::Direction, Label, ModifyProof, ProofElement};

#[derive(Debug)]
pub struct Run {
    pub claimed_root: Label,
    pub proof: ModifyProof,
    pub new_value: Option<Vec<u8>>,
    pub insert_if_absent: bool,
}

impl<'a> Arbitrary<'a> for Run {
    fn arbitrary(input: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let claimed_root = input.arbitrary()?;
        let key = short_bytes(input)?;
        let len = input.int_in_range(0..=64)?;
        let elements = (0..len)
            .map(|_| element(input))
            .collect::<arbitrary::Result<Vec<_>>>()?;

        let new_value = if input.arbitrary()? {
            Some(short_bytes(input)?)
        } else {
            None
        };

        Ok(Run {
            claimed_root,
            proof: ModifyProof { key, elements },
            new_value,
            insert_if_absent: input.arbitrary()?,
        })
    }
}

// short keys collide often enough to pass the ordering checks.
fn short_bytes(input: &mut Unstructured) -> arbitrary::Result<Vec<u8>> {
    let len = input.int_in_range(0..=8)?;
    Ok(input.bytes(len)?.to_vec())
}

fn element(input: &mut Unstructured) -> arbitrary::Result<ProofElement> {
    Ok(match input.int_in_range(0..=9)? {
        0 => ProofElement::Direction(Direction::LeafFound),
        1 => ProofElement::Direction(Direction::LeafNotFound),
        2 => ProofElement::Direction(Direction::GoingLeft),
        3 => ProofElement::Direction(Direction::GoingRight),
        4 => ProofElement::Key(short_bytes(input)?),
        5 => ProofElement::NextLeafKey(short_bytes(input)?),
        6 => ProofElement::Value(short_bytes(input)?),
        7 => ProofElement::LeftLabel(input.arbitrary()?),
        8 => ProofElement::RightLabel(input.arbitrary()?),
        _ => ProofElement::Balance(input.int_in_range(0..=3)?),
    })
}
