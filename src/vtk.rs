use crate::domain::*;
use crate::error::*;
use crate::grid::Grid;
use nalgebra::vector;
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet,
    ElementType, IOBuffer, UnstructuredGridPiece, Version, VertexNumbers,
    Vtk,
};

/// Hexahedral unstructured grid with one `values` scalar per point,
/// points placed at their physical positions.
pub fn write_vtk3d<F: AsRef<std::path::Path>, DomainType: DomainView<3>>(
    domain: &DomainType,
    grid: &Grid<3>,
    s: &F,
) -> Result<()> {
    profiling::scope!("vtk::write_vtk3d");
    log::info!("writing vtk: {:?}", s.as_ref());
    let aabb = domain.aabb();

    let buffer_size = aabb.buffer_size();
    let mut points = Vec::with_capacity(3 * buffer_size);
    for coord in aabb.coord_iter() {
        let p = grid.position(&coord);
        points.push(p[0] as f32);
        points.push(p[1] as f32);
        points.push(p[2] as f32);
    }
    debug_assert_eq!(points.len(), buffer_size * 3);

    let cell_bounds = aabb.cell_bounds();
    let n_cells = cell_bounds.buffer_size();
    let mut connectivity = Vec::with_capacity(8 * n_cells);
    let mut offsets = Vec::with_capacity(n_cells);
    let mut cell_types = Vec::with_capacity(n_cells);
    let mut offset = 8;
    for cell_coord in cell_bounds.coord_iter() {
        let corners = [
            vector![0, 0, 0],
            vector![1, 0, 0],
            vector![1, 0, 1],
            vector![0, 0, 1],
            vector![0, 1, 0],
            vector![1, 1, 0],
            vector![1, 1, 1],
            vector![0, 1, 1],
        ];
        for corner in corners {
            let corner_coord = cell_coord + corner;
            connectivity.push(aabb.coord_to_linear(&corner_coord) as u64);
        }
        offsets.push(offset);
        cell_types.push(CellType::Hexahedron);
        offset += 8;
    }

    let data: Vec<f32> = domain.buffer().iter().map(|v| *v as f32).collect();

    Vtk {
        version: Version::Auto,
        title: String::new(),
        byte_order: ByteOrder::LittleEndian,
        file_path: None,
        data: DataSet::inline(UnstructuredGridPiece {
            points: IOBuffer::F32(points),
            cells: Cells {
                cell_verts: VertexNumbers::XML {
                    connectivity,
                    offsets,
                },
                types: cell_types,
            },
            data: Attributes {
                point: vec![Attribute::DataArray(DataArray {
                    name: "values".to_string(),
                    elem: ElementType::Scalars {
                        num_comp: 1,
                        lookup_table: None,
                    },
                    data: IOBuffer::F32(data),
                })],
                cell: vec![],
            },
        }),
    }
    .export(s)
    .map_err(|e| Error::Vtk(format!("{e:?}")))
}
