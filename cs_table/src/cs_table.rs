use crate::error::{CsError, CsResult};
use crate::recar::OrderedAcquisition;

// largest table the scanner will accept
pub const MAX_TABLE_ELEMENTS:usize = 196095;

/// View table of centered (k_phase,k_slice) pairs, flattened the way the scanner reads it:
/// one integer per line, phase then slice for each view.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct CSTable {
    elements:Vec<i16>,
}

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct KspaceCoord {
    pub k_phase:i16,
    pub k_slice:i16
}

fn to_element(value:i64) -> CsResult<i16> {
    i16::try_from(value).map_err(|_| CsError::Parameter(format!("k-space coordinate {} does not fit the table",value)))
}

impl CSTable {
    /// One cardiac pass (the first phase in the order) of the acquisition order.
    pub fn from_order(order:&[OrderedAcquisition],matrix_size:[usize;2]) -> CsResult<Self> {
        let phase_off = (matrix_size[0]/2) as i64;
        let slice_off = (matrix_size[1]/2) as i64;
        let first_phase = match order.first() {
            Some(acq) => acq.cardiac_phase,
            None => return Ok(Self{elements:vec![]})
        };
        let mut elements = Vec::<i16>::new();
        for acq in order.iter().filter(|acq| acq.cardiac_phase == first_phase) {
            elements.push(to_element(acq.phase_index as i64 - phase_off)?);
            elements.push(to_element(acq.slice_index as i64 - slice_off)?);
        }
        if elements.len() > MAX_TABLE_ELEMENTS {
            return Err(CsError::Parameter(format!("table has {} elements, limit is {}",elements.len(),MAX_TABLE_ELEMENTS)));
        }
        Ok(Self{elements})
    }

    pub fn parse(s:&str) -> CsResult<Self> {
        let mut elements = Vec::<i16>::new();
        for line in s.lines().map(|line| line.trim()).filter(|line| !line.is_empty()) {
            let e = line.parse::<i16>().map_err(|_| CsError::Parameter(format!("cannot parse table element {}",line)))?;
            elements.push(e);
        }
        if (elements.len() % 2) != 0 {
            return Err(CsError::Parameter(String::from("table must have an even number of elements")));
        }
        Ok(Self{elements})
    }

    pub fn serialize(&self) -> String {
        let mut s = self.elements.iter().map(|e| e.to_string()).collect::<Vec<String>>().join("\n");
        s.push('\n');
        s
    }

    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> Vec<i16> {
        self.elements.clone()
    }

    pub fn n_views(&self) -> usize {
        self.elements.len()/2
    }

    pub fn coordinates(&self,read_element_offset:usize) -> Vec<KspaceCoord> {
        let mut coords = Vec::<KspaceCoord>::with_capacity(self.n_views());
        for i in read_element_offset..self.n_views() {
            coords.push(
                KspaceCoord {
                    k_phase:self.elements[2*i],
                    k_slice:self.elements[2*i+1],
                }
            )
        }
        coords
    }

    pub fn indices(&self,read_element_offset:usize,matrix_size:[i16;2]) -> Vec<(i16,i16)> {
        let phase_off = matrix_size[0]/2;
        let slice_off = matrix_size[1]/2;
        self.coordinates(read_element_offset).iter().map(|coord| (coord.k_phase + phase_off,coord.k_slice + slice_off)).collect()
    }
}
